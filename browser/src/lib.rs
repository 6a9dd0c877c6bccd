//! Client side of the job board: the stores jobs are read from, the filter
//! state the user edits, and the list and detail state derived from both.

pub mod config;
pub mod filter_state;
pub mod listing;
pub mod memory;
pub mod service;
pub mod session;
pub mod store;
pub mod supabase;
pub mod view;

pub use config::{Settings, SettingsError, SupabaseConfig};
pub use filter_state::{FilterStateManager, SEARCH_DEBOUNCE};
pub use listing::{JobListController, ListState, Ticket};
pub use memory::MemoryStore;
pub use service::JobService;
pub use session::BrowseSession;
pub use store::{JobStore, StorePage};
pub use supabase::SupabaseStore;
pub use view::{DetailView, JobCard, JobDetail, ListView, Pagination};
