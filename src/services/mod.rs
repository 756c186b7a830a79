pub mod background;
pub mod classifier;
pub mod error_translator;
pub mod fitting;
pub mod orchestrator;
pub mod poller;
pub mod storage;
