pub mod event;

pub use event::{storage_precision, Event, EventPatch, FieldUpdate, NewEvent, UploadAuthorization};
