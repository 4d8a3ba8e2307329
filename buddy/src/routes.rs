use std::fmt;

/// Navigation targets of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/` forwards to another route.
    Redirect(Box<Route>),
    Search,
    Paper(String),
    NotFound(String),
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let trimmed = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = trimmed.trim_end_matches('/');

        match trimmed {
            "" => Self::Redirect(Box::new(Self::Search)),
            "/search" => Self::Search,
            _ => match trimmed.strip_prefix("/paper/") {
                Some(id) if !id.is_empty() => Self::Paper(id.to_string()),
                _ => Self::NotFound(path.to_string()),
            },
        }
    }

    /// Follows redirects to the route that actually renders.
    pub fn resolve(self) -> Self {
        match self {
            Self::Redirect(target) => target.resolve(),
            other => other,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Redirect(_) => "/".to_string(),
            Self::Search => "/search".to_string(),
            Self::Paper(id) => format!("/paper/{id}"),
            Self::NotFound(path) => path.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
