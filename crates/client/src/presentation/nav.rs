//! Navigation links for the navbar and the scan-tools sidebar.
//!
//! Pages live either at the site root or one level down in `scan/`; hrefs are
//! relative, so every link is computed against the current page's path.

use cyberguard_core::{ScanType, User};

use super::theme::Theme;

/// Folder holding the per-scan-type pages.
const SCAN_FOLDER: &str = "scan/";

/// A rendered navigation link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub href: String,
    /// Icon name, if the link shows one.
    pub icon: Option<&'static str>,
    /// Whether the link points at the current page.
    pub active: bool,
}

/// Account dropdown of an authenticated navbar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMenu {
    pub email: String,
    /// `Administrator` or `User`.
    pub role_label: &'static str,
    pub dashboard_href: String,
}

/// Navbar contents for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navbar {
    pub home_href: String,
    /// Section links; empty for anonymous visitors.
    pub links: Vec<NavLink>,
    /// Present when a user is signed in.
    pub account: Option<AccountMenu>,
    /// Sign-in and get-started links; empty when a user is signed in.
    pub guest_links: Vec<NavLink>,
    pub theme_icon: &'static str,
    /// Where to navigate after signing out.
    pub sign_out_href: String,
}

/// The page being rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    path: String,
    in_scan_folder: bool,
}

impl PageContext {
    /// Context for the page at `path` (e.g. `/scan/url.html`).
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let in_scan_folder = path.contains("/scan/");
        Self {
            path,
            in_scan_folder,
        }
    }

    /// Whether the page sits in the `scan/` folder.
    #[must_use]
    pub const fn in_scan_folder(&self) -> bool {
        self.in_scan_folder
    }

    /// Relative href of `target`, a path given relative to the site root.
    #[must_use]
    pub fn resolve(&self, target: &str) -> String {
        let scan_target = target.starts_with(SCAN_FOLDER);

        if self.in_scan_folder && !scan_target {
            return format!("../{target}");
        }
        if !self.in_scan_folder && scan_target {
            return target.to_owned();
        }
        target.replacen(SCAN_FOLDER, "", 1)
    }

    /// Whether the current path mentions `fragment`.
    fn mentions(&self, fragment: &str) -> bool {
        self.path.contains(fragment)
    }

    /// Links of the scan-tools sidebar: one per scan type, then Domain Check.
    #[must_use]
    pub fn sidebar_links(&self) -> Vec<NavLink> {
        let mut links: Vec<NavLink> = ScanType::ALL
            .into_iter()
            .map(|scan_type| {
                let (label, icon) = scan_tool(scan_type);
                let href = self.resolve(&format!("{SCAN_FOLDER}{scan_type}.html"));
                self.sidebar_link(label, icon, href)
            })
            .collect();

        links.push(self.sidebar_link(
            "Domain Check",
            "server",
            self.resolve("domain-check.html"),
        ));
        links
    }

    fn sidebar_link(&self, label: &'static str, icon: &'static str, href: String) -> NavLink {
        let page = href.rsplit('/').next().unwrap_or(&href);
        let active = self.mentions(page);
        NavLink {
            label,
            href,
            icon: Some(icon),
            active,
        }
    }

    /// Navbar for the current user.
    #[must_use]
    pub fn navbar(&self, user: Option<&User>, is_admin: bool, theme: Theme) -> Navbar {
        let (links, account, guest_links) = match user {
            Some(user) => {
                let mut links = vec![
                    self.section_link("Dashboard", "dashboard.html", "dashboard"),
                    self.section_link("Scan", "scan/url.html", "scan"),
                    self.section_link("History", "history.html", "history"),
                ];
                if is_admin {
                    links.push(self.section_link("Admin", "admin.html", "admin"));
                }

                let account = AccountMenu {
                    email: user.email_or_empty().to_owned(),
                    role_label: if is_admin { "Administrator" } else { "User" },
                    dashboard_href: self.resolve("dashboard.html"),
                };
                (links, Some(account), Vec::new())
            }
            None => {
                let guest_links = vec![
                    NavLink {
                        label: "Sign In",
                        href: self.resolve("login.html"),
                        icon: None,
                        active: false,
                    },
                    NavLink {
                        label: "Get Started",
                        href: self.resolve("register.html"),
                        icon: None,
                        active: false,
                    },
                ];
                (Vec::new(), None, guest_links)
            }
        };

        Navbar {
            home_href: self.resolve("index.html"),
            links,
            account,
            guest_links,
            theme_icon: theme.toggle_icon(),
            sign_out_href: self.resolve("index.html"),
        }
    }

    fn section_link(&self, label: &'static str, target: &str, section: &str) -> NavLink {
        NavLink {
            label,
            href: self.resolve(target),
            icon: None,
            active: self.mentions(section),
        }
    }
}

/// Sidebar label and icon of a scan type.
const fn scan_tool(scan_type: ScanType) -> (&'static str, &'static str) {
    match scan_type {
        ScanType::Url => ("URL Scanner", "link"),
        ScanType::Email => ("Email Analyzer", "mail"),
        ScanType::Message => ("SMS Detector", "message-square"),
        ScanType::File => ("File Scanner", "file"),
        ScanType::Website => ("Website Inspector", "globe"),
        ScanType::Qr => ("QR Scanner", "qr-code"),
    }
}
