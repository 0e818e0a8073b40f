pub mod config;
pub mod debounce;
pub mod fit;
pub mod fixture;
pub mod gallery;
pub mod item;
pub mod menu;
pub mod pointer;
pub mod policy;
pub mod presenter;
pub mod report;
#[doc(hidden)]
pub mod test_support;
pub mod view;
pub mod widgets;
