// Backend resource families
//
// Payload shapes for each content type the admin area manages. Field names
// follow the backend's camelCase JSON; Mongo-style `_id` is accepted as `id`.

mod blog;
mod education;
mod event;
mod job;

pub use blog::{Blog, BlogClient, BlogDraft};
pub use education::{Education, EducationClient, EducationDraft};
pub use event::{BusinessEvent, BusinessEventClient, BusinessEventDraft};
pub use job::{Job, JobClient, JobDraft};
