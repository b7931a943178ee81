//! Admin resource handlers: list, get, create, delete for every content
//! family, driven through the same `AdminController` the web admin uses.

use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use tabled::Tabled;

use backoffice_core::{
    AdminController, Backoffice, Blog, BlogDraft, BusinessEvent, BusinessEventDraft, Education,
    EducationDraft, Guarded, Job, JobDraft, ListFilter, Managed, Notice, Resource, ResourceClient,
    ResourceId,
};

use crate::cli::{
    BlogCreateArgs, BlogsCommand, EducationCreateArgs, EducationsCommand, EventCreateArgs,
    EventsCommand, FromFileArg, GlobalOpts, JobCreateArgs, JobsCommand, ListArgs, OutputFormat,
};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Per-family presentation ─────────────────────────────────────────

/// How one resource family renders and builds its create payload.
pub trait Listing: Managed {
    type Row: Tabled;
    type CreateArgs;

    fn row(&self) -> Self::Row;

    fn detail(&self) -> String;

    fn draft(args: Self::CreateArgs) -> Result<Self::Draft, CliError>;
}

/// A resource subcommand, independent of family.
pub enum Action<R: Listing> {
    List(ListArgs),
    Get(ResourceId),
    Create(R::CreateArgs),
    Delete(ResourceId),
}

fn created(at: Option<&DateTime<Utc>>) -> String {
    at.map_or_else(String::new, |t| t.format("%Y-%m-%d").to_string())
}

fn timestamp(at: Option<&DateTime<Utc>>) -> String {
    at.map_or_else(String::new, DateTime::to_rfc3339)
}

fn or_dash(value: Option<&String>) -> String {
    value.cloned().unwrap_or_else(|| "-".into())
}

/// `--from-file` payload, if one was given.
fn from_file<D: serde::de::DeserializeOwned>(file: &FromFileArg) -> Result<Option<D>, CliError> {
    file.from_file.as_deref().map(read_draft).transpose()
}

fn read_draft<D: serde::de::DeserializeOwned>(path: &Path) -> Result<D, CliError> {
    let value = util::read_json_file(path)?;
    serde_json::from_value(value).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: e.to_string(),
    })
}

// ── Blogs ───────────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct BlogRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl Listing for Blog {
    type Row = BlogRow;
    type CreateArgs = BlogCreateArgs;

    fn row(&self) -> BlogRow {
        BlogRow {
            id: self.id.to_string(),
            title: self.title.clone(),
            category: self.category.clone(),
            created: created(self.created_at.as_ref()),
        }
    }

    fn detail(&self) -> String {
        output::detail(&[
            ("ID", self.id.to_string()),
            ("Title", self.title.clone()),
            ("Category", self.category.clone()),
            ("Image", self.image.clone().unwrap_or_default()),
            ("Created", timestamp(self.created_at.as_ref())),
            ("Content", self.content.clone()),
        ])
    }

    fn draft(args: BlogCreateArgs) -> Result<BlogDraft, CliError> {
        if let Some(draft) = from_file(&args.file)? {
            return Ok(draft);
        }
        Ok(BlogDraft {
            title: args.title.unwrap_or_default(),
            content: args.content,
            category: args.category,
            image: args.image,
        })
    }
}

impl From<BlogsCommand> for Action<Blog> {
    fn from(cmd: BlogsCommand) -> Self {
        match cmd {
            BlogsCommand::List(list) => Self::List(list),
            BlogsCommand::Get { id } => Self::Get(id.into()),
            BlogsCommand::Create(args) => Self::Create(args),
            BlogsCommand::Delete { id } => Self::Delete(id.into()),
        }
    }
}

// ── Educations ──────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct EducationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Country")]
    country: String,
    #[tabled(rename = "Institution")]
    institution: String,
}

impl Listing for Education {
    type Row = EducationRow;
    type CreateArgs = EducationCreateArgs;

    fn row(&self) -> EducationRow {
        EducationRow {
            id: self.id.to_string(),
            title: self.title.clone(),
            country: or_dash(self.country.as_ref()),
            institution: or_dash(self.institution.as_ref()),
        }
    }

    fn detail(&self) -> String {
        output::detail(&[
            ("ID", self.id.to_string()),
            ("Title", self.title.clone()),
            ("Country", self.country.clone().unwrap_or_default()),
            ("Institution", self.institution.clone().unwrap_or_default()),
            ("Created", timestamp(self.created_at.as_ref())),
            ("Description", self.description.clone()),
        ])
    }

    fn draft(args: EducationCreateArgs) -> Result<EducationDraft, CliError> {
        if let Some(draft) = from_file(&args.file)? {
            return Ok(draft);
        }
        Ok(EducationDraft {
            title: args.title.unwrap_or_default(),
            description: args.description,
            country: args.country,
            institution: args.institution,
        })
    }
}

impl From<EducationsCommand> for Action<Education> {
    fn from(cmd: EducationsCommand) -> Self {
        match cmd {
            EducationsCommand::List(list) => Self::List(list),
            EducationsCommand::Get { id } => Self::Get(id.into()),
            EducationsCommand::Create(args) => Self::Create(args),
            EducationsCommand::Delete { id } => Self::Delete(id.into()),
        }
    }
}

// ── Jobs ────────────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct JobRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Company")]
    company: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Type")]
    employment_type: String,
}

impl Listing for Job {
    type Row = JobRow;
    type CreateArgs = JobCreateArgs;

    fn row(&self) -> JobRow {
        JobRow {
            id: self.id.to_string(),
            title: self.title.clone(),
            company: or_dash(self.company.as_ref()),
            location: or_dash(self.location.as_ref()),
            employment_type: or_dash(self.employment_type.as_ref()),
        }
    }

    fn detail(&self) -> String {
        output::detail(&[
            ("ID", self.id.to_string()),
            ("Title", self.title.clone()),
            ("Company", self.company.clone().unwrap_or_default()),
            ("Location", self.location.clone().unwrap_or_default()),
            ("Type", self.employment_type.clone().unwrap_or_default()),
            ("Created", timestamp(self.created_at.as_ref())),
            ("Description", self.description.clone()),
        ])
    }

    fn draft(args: JobCreateArgs) -> Result<JobDraft, CliError> {
        if let Some(draft) = from_file(&args.file)? {
            return Ok(draft);
        }
        Ok(JobDraft {
            title: args.title.unwrap_or_default(),
            description: args.description,
            company: args.company,
            location: args.location,
            employment_type: args.employment_type,
        })
    }
}

impl From<JobsCommand> for Action<Job> {
    fn from(cmd: JobsCommand) -> Self {
        match cmd {
            JobsCommand::List(list) => Self::List(list),
            JobsCommand::Get { id } => Self::Get(id.into()),
            JobsCommand::Create(args) => Self::Create(args),
            JobsCommand::Delete { id } => Self::Delete(id.into()),
        }
    }
}

// ── Business events ─────────────────────────────────────────────────

#[derive(Tabled)]
pub struct EventRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Venue")]
    venue: String,
    #[tabled(rename = "Date")]
    date: String,
}

impl Listing for BusinessEvent {
    type Row = EventRow;
    type CreateArgs = EventCreateArgs;

    fn row(&self) -> EventRow {
        EventRow {
            id: self.id.to_string(),
            title: self.title.clone(),
            venue: or_dash(self.venue.as_ref()),
            date: self
                .date
                .map_or_else(|| "-".into(), |d| d.format("%Y-%m-%d %H:%M").to_string()),
        }
    }

    fn detail(&self) -> String {
        output::detail(&[
            ("ID", self.id.to_string()),
            ("Title", self.title.clone()),
            ("Venue", self.venue.clone().unwrap_or_default()),
            ("Date", timestamp(self.date.as_ref())),
            ("Created", timestamp(self.created_at.as_ref())),
            ("Description", self.description.clone()),
        ])
    }

    fn draft(args: EventCreateArgs) -> Result<BusinessEventDraft, CliError> {
        if let Some(draft) = from_file(&args.file)? {
            return Ok(draft);
        }
        Ok(BusinessEventDraft {
            title: args.title.unwrap_or_default(),
            description: args.description,
            venue: args.venue,
            date: args.date,
        })
    }
}

impl From<EventsCommand> for Action<BusinessEvent> {
    fn from(cmd: EventsCommand) -> Self {
        match cmd {
            EventsCommand::List(list) => Self::List(list),
            EventsCommand::Get { id } => Self::Get(id.into()),
            EventsCommand::Create(args) => Self::Create(args),
            EventsCommand::Delete { id } => Self::Delete(id.into()),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

impl From<ListArgs> for ListFilter {
    fn from(args: ListArgs) -> Self {
        let mut filter = ListFilter::default();
        if let Some(page) = args.page {
            filter = filter.page(page);
        }
        if let Some(limit) = args.limit {
            filter = filter.limit(limit);
        }
        if let Some(search) = args.search {
            filter = filter.search(search);
        }
        if let Some(category) = args.category {
            filter = filter.category(category);
        }
        filter
    }
}

pub async fn handle<R: Listing>(
    backoffice: &Backoffice,
    action: Action<R>,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let controller = match backoffice.admin::<R>() {
        Guarded::Mounted(controller) => controller,
        Guarded::Loading | Guarded::Redirect(_) => {
            return Err(CliError::NotAuthenticated {
                profile: resolved.profile_name.clone(),
            });
        }
    };

    let result = run(&controller, action, global).await;
    controller.unmount();
    result
}

async fn run<R: Listing>(
    controller: &AdminController<ResourceClient<R>>,
    action: Action<R>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match action {
        Action::List(list) => {
            controller.set_filter(list.into());
            let spinner = spinner(global, &format!("Loading {}", R::PLURAL));
            let notice = controller.refresh().await;
            spinner.finish_and_clear();
            fail_on_error(notice)?;

            let items = controller.state().items;
            let out = output::render_list(&global.output, &items, R::row, |item| {
                item.id().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        Action::Get(id) => {
            fail_on_error(controller.select(&id).await)?;
            let Some(item) = controller.state().selected else {
                return Err(CliError::Rejected {
                    message: format!("Failed to load {}", R::LABEL),
                });
            };
            let out = output::render_single(&global.output, &item, R::detail, |item| {
                item.id().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        Action::Create(args) => {
            controller.set_draft(R::draft(args)?);
            let spinner = spinner(global, &format!("Creating {}", R::LABEL));
            let notice = controller.submit_pending().await;
            spinner.finish_and_clear();
            report(notice, global)
        }

        Action::Delete(id) => {
            if !global.yes && !std::io::stdin().is_terminal() {
                return Err(CliError::NonInteractiveRequiresYes {
                    action: format!("delete {}", R::LABEL),
                });
            }
            if !util::confirm(&format!("Delete {} {id}?", R::LABEL), global.yes)? {
                return Ok(());
            }
            let notice = controller.remove(&id).await;
            report(notice, global)
        }
    }
}

/// Error notices become errors; success is silent.
fn fail_on_error(notice: Option<Notice>) -> Result<(), CliError> {
    match notice.and_then(CliError::from_notice) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Print a success notice, or fail with an error notice.
fn report(notice: Option<Notice>, global: &GlobalOpts) -> Result<(), CliError> {
    let Some(notice) = notice else {
        return Ok(());
    };
    if notice.is_error() {
        return fail_on_error(Some(notice));
    }
    if !global.quiet {
        let color = output::should_color(&global.color);
        eprintln!("{}", output::success_line(notice.message(), color));
    }
    Ok(())
}

/// Spinner for interactive table output; hidden otherwise.
fn spinner(global: &GlobalOpts, message: &str) -> ProgressBar {
    if global.quiet
        || !matches!(global.output, OutputFormat::Table)
        || !std::io::stderr().is_terminal()
    {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    fn blog_args(title: Option<&str>, from_file: Option<std::path::PathBuf>) -> BlogCreateArgs {
        BlogCreateArgs {
            file: FromFileArg { from_file },
            title: title.map(str::to_owned),
            content: "Body".into(),
            category: "news".into(),
            image: None,
        }
    }

    #[test]
    fn blog_draft_from_flags() {
        let draft = Blog::draft(blog_args(Some("Hello"), None)).unwrap();
        assert_eq!(draft.title, "Hello");
        assert_eq!(draft.content, "Body");
        assert_eq!(draft.category, "news");
    }

    #[test]
    fn blog_draft_from_file_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"title":"From file","content":"c","category":"visa"}}"#
        )
        .unwrap();

        let draft = Blog::draft(blog_args(None, Some(file.path().to_path_buf()))).unwrap();
        assert_eq!(draft.title, "From file");
        assert_eq!(draft.category, "visa");
    }

    #[test]
    fn draft_file_with_wrong_shape_is_a_validation_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"venue":"Hall"}}"#).unwrap();

        let args = EventCreateArgs {
            file: FromFileArg {
                from_file: Some(file.path().to_path_buf()),
            },
            title: None,
            description: String::new(),
            venue: None,
            date: None,
        };
        let err = BusinessEvent::draft(args).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }

    #[test]
    fn list_args_become_filter() {
        let filter: ListFilter = ListArgs {
            page: Some(2),
            limit: None,
            search: Some("rust".into()),
            category: None,
        }
        .into();
        assert_eq!(filter, ListFilter::default().page(2).search("rust"));
    }

    #[test]
    fn job_row_fills_missing_fields() {
        let job: Job = serde_json::from_value(serde_json::json!({
            "id": 7,
            "title": "Welder",
            "description": "",
        }))
        .unwrap();
        let row = job.row();
        assert_eq!(row.id, "7");
        assert_eq!(row.company, "-");
    }
}
