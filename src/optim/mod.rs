pub mod backprop;

pub use backprop::backpropagate;
