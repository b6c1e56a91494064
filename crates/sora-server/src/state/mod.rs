pub mod store;

pub use store::{AppState, Project, SiteRecord, StoreError};
