pub mod dialogs;
pub mod outline;
pub mod panels;
pub mod plan;
