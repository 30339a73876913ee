pub mod completion;
pub mod player;
pub mod recorder;
