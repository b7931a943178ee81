//! `backoffice routes`: the site's route map as the session guard sees it.

use serde::Serialize;
use tabled::Tabled;

use backoffice_core::{AuthState, GuardDecision, Route, RouteGuard};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct RouteView {
    path: &'static str,
    title: &'static str,
    protected: bool,
    decision: String,
}

#[derive(Tabled)]
struct RouteRow {
    #[tabled(rename = "Path")]
    path: &'static str,
    #[tabled(rename = "Page")]
    title: &'static str,
    #[tabled(rename = "Access")]
    access: &'static str,
    #[tabled(rename = "Guard")]
    decision: String,
}

impl From<&RouteView> for RouteRow {
    fn from(v: &RouteView) -> Self {
        Self {
            path: v.path,
            title: v.title,
            access: if v.protected { "admin" } else { "public" },
            decision: v.decision.clone(),
        }
    }
}

fn describe(decision: GuardDecision) -> String {
    match decision {
        GuardDecision::Allow => "allow".into(),
        GuardDecision::Loading => "loading".into(),
        GuardDecision::Redirect(to) => format!("redirect {to}"),
    }
}

fn route_views(guard: &RouteGuard) -> Vec<RouteView> {
    Route::all()
        .map(|route| RouteView {
            path: route.path(),
            title: route.title(),
            protected: route.is_protected(),
            decision: describe(guard.decide(route)),
        })
        .collect()
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let profile_name = config::active_profile_name(global, &cfg);
    let auth = AuthState::load(config::session_store(global, &cfg, &profile_name));
    let guard = RouteGuard::new(auth.view());

    let views = route_views(&guard);
    let out = output::render_list(&global.output, &views, |v| RouteRow::from(v), |v| {
        v.path.to_owned()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use backoffice_core::SessionStore;
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn anonymous_session_redirects_admin_routes() {
        let auth = AuthState::load(SessionStore::in_memory());
        let views = route_views(&RouteGuard::new(auth.view()));

        let home = views.iter().find(|v| v.path == "/").unwrap();
        assert_eq!(home.decision, "allow");
        let blogs = views.iter().find(|v| v.path == "/admin/blogs").unwrap();
        assert_eq!(blogs.decision, "redirect /login");
    }

    #[test]
    fn logged_in_session_allows_everything() {
        let auth = AuthState::load(SessionStore::ephemeral(&SecretString::from("t")));
        let views = route_views(&RouteGuard::new(auth.view()));
        assert!(views.iter().all(|v| v.decision == "allow"));
    }
}
