// ── Navigation surface ──
//
// Every page the site exposes. Only admin routes are protected.

use std::fmt;

use strum::{EnumIter, IntoEnumIterator};

/// A section of the admin area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum AdminSection {
    Dashboard,
    Blogs,
    Educations,
    Jobs,
    Events,
}

impl AdminSection {
    pub fn path(self) -> &'static str {
        match self {
            Self::Dashboard => "/admin",
            Self::Blogs => "/admin/blogs",
            Self::Educations => "/admin/educations",
            Self::Jobs => "/admin/jobs",
            Self::Events => "/admin/events",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Blogs => "Blogs",
            Self::Educations => "Education programmes",
            Self::Jobs => "Jobs",
            Self::Events => "Business events",
        }
    }
}

/// A navigable page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Recruitment,
    Visa,
    LandHomes,
    BusinessEvents,
    Education,
    Blog,
    Contact,
    Login,
    Admin(AdminSection),
}

const PUBLIC: [Route; 9] = [
    Route::Home,
    Route::Recruitment,
    Route::Visa,
    Route::LandHomes,
    Route::BusinessEvents,
    Route::Education,
    Route::Blog,
    Route::Contact,
    Route::Login,
];

impl Route {
    /// Where a successful login lands.
    pub const AFTER_LOGIN: Route = Route::Admin(AdminSection::Dashboard);
    /// Where logout lands.
    pub const AFTER_LOGOUT: Route = Route::Home;

    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Recruitment => "/recruitment",
            Self::Visa => "/visa",
            Self::LandHomes => "/land-homes",
            Self::BusinessEvents => "/business-events",
            Self::Education => "/education",
            Self::Blog => "/blog",
            Self::Contact => "/contact",
            Self::Login => "/login",
            Self::Admin(section) => section.path(),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Recruitment => "Recruitment",
            Self::Visa => "Visa services",
            Self::LandHomes => "Land & homes",
            Self::BusinessEvents => "Business events",
            Self::Education => "Education",
            Self::Blog => "Blog",
            Self::Contact => "Contact",
            Self::Login => "Admin login",
            Self::Admin(section) => section.title(),
        }
    }

    /// Admin routes require an authenticated session.
    pub fn is_protected(self) -> bool {
        matches!(self, Self::Admin(_))
    }

    /// Every route, public pages first.
    pub fn all() -> impl Iterator<Item = Route> {
        PUBLIC
            .into_iter()
            .chain(AdminSection::iter().map(Route::Admin))
    }

    /// Look up a route by path. A trailing slash is ignored.
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        let wanted = if trimmed.is_empty() { "/" } else { trimmed };
        Self::all().find(|route| route.path() == wanted)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
