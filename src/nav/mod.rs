//! Main navigation entries and their visibility rules.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct NavRoute {
    pub href: &'static str,
    pub label: &'static str,
    /// Shown only to signed-in users.
    pub protected: bool,
}

pub(crate) const ROUTES: &[NavRoute] = &[
    NavRoute { href: "/profile/dashboard", label: "Dashboard", protected: true },
    NavRoute { href: "/profile/sleep", label: "Sono", protected: true },
    NavRoute { href: "/profile/habits", label: "Hábitos", protected: true },
    NavRoute { href: "/profile/tasks", label: "Tarefas", protected: true },
    NavRoute { href: "/profile/shopping", label: "Compras", protected: true },
    NavRoute { href: "/profile", label: "Meu Perfil", protected: true },
    NavRoute { href: "/about", label: "About", protected: false },
    NavRoute { href: "/login", label: "Login", protected: false },
    NavRoute { href: "/signup", label: "Cadastro", protected: false },
];

const AUTH_LINKS: &[&str] = &["/login", "/signup", "/about"];

pub(crate) fn visible_routes(authenticated: bool, hide_auth_links: bool) -> Vec<NavRoute> {
    ROUTES
        .iter()
        .filter(|r| authenticated || !r.protected)
        .filter(|r| !hide_auth_links || !AUTH_LINKS.contains(&r.href))
        .copied()
        .collect()
}

/// `/profile/x` and `/x` are the same page.
fn canonical(path: &str) -> &str {
    let path = path.trim_end_matches('/');
    match path.strip_prefix("/profile") {
        Some(rest) if rest.starts_with('/') => rest,
        _ if path.is_empty() => "/",
        _ => path,
    }
}

/// Whether `route` should be highlighted for the current `pathname`.
pub(crate) fn is_active(route: &NavRoute, pathname: &str) -> bool {
    let current = canonical(pathname);
    let target = canonical(route.href);
    current == target
        || (target != "/" && current.starts_with(target) && current[target.len()..].starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hrefs(routes: &[NavRoute]) -> Vec<&'static str> {
        routes.iter().map(|r| r.href).collect()
    }

    #[test]
    fn test_anonymous_sees_public_routes() {
        assert_eq!(hrefs(&visible_routes(false, false)), ["/about", "/login", "/signup"]);
        assert!(visible_routes(false, true).is_empty());
    }

    #[test]
    fn test_authenticated_sees_everything_unless_hidden() {
        assert_eq!(visible_routes(true, false).len(), ROUTES.len());
        let hidden = hrefs(&visible_routes(true, true));
        assert!(hidden.contains(&"/profile"));
        assert!(!hidden.contains(&"/login"));
        assert!(!hidden.contains(&"/about"));
    }

    #[test]
    fn test_active_matches_aliases_and_subpages() {
        let sleep = ROUTES[1];
        assert!(is_active(&sleep, "/sleep"));
        assert!(is_active(&sleep, "/profile/sleep"));
        assert!(is_active(&sleep, "/sleep/history"));
        assert!(!is_active(&sleep, "/sleepy"));

        let profile = ROUTES[5];
        assert!(is_active(&profile, "/profile"));
        assert!(is_active(&profile, "/profile/"));
        assert!(!is_active(&profile, "/profile/tasks"));
    }
}
