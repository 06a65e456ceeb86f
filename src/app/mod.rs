pub mod derivers;
