//! Watcher engine: the IO collaborators around the core and the check cycle.
mod catalog;
mod cycle;
mod decode;
mod digest;
mod extract;
mod fetch;
mod notify;
mod page;
mod persist;
mod storage;

pub use catalog::{CatalogSource, ScrapingCatalog};
pub use cycle::{mute_item, run_cycle, CycleContext, CycleError, MuteOutcome};
pub use decode::{decode_page, DecodeError, DecodedPage};
pub use digest::Digest;
pub use extract::{ExtractError, ProductExtractor};
pub use fetch::{default_headers, FetchSettings, Fetcher, ReqwestFetcher};
pub use notify::{LogNotifier, Notifier, NotifyError, OutboxNotifier, WebhookNotifier};
pub use page::{CatalogPage, FailureKind, FetchError};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use storage::FsBlobStore;
