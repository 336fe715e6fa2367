//! HTML Pages
//!
//! Landing, success and cancel pages rendered with Tera. Template names end
//! in `.html` so the studio name and service copy are autoescaped. The year
//! in the footer is filled in by the browser.

use serde::Serialize;
use tera::{Context, Tera};

const LANDING: &str = "landing.html";
const SUCCESS: &str = "success.html";
const CANCEL: &str = "cancel.html";

/// One card in the landing page's services grid
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Service {
    pub title: &'static str,
    pub description: &'static str,
}

pub const SERVICES: [Service; 3] = [
    Service {
        title: "Brand Identity",
        description: "Logo, typography, color, and a crisp mini style guide.",
    },
    Service {
        title: "Website Design",
        description: "High-converting marketing sites built for speed and clarity.",
    },
    Service {
        title: "Art Direction",
        description: "Creative direction for photography and campaign visuals.",
    },
];

/// Compiled page templates, built once at startup
pub struct Pages {
    tera: Tera,
}

impl Pages {
    pub fn new() -> tera::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (LANDING, include_str!("../templates/landing.html")),
            (SUCCESS, include_str!("../templates/success.html")),
            (CANCEL, include_str!("../templates/cancel.html")),
        ])?;

        Ok(Self { tera })
    }

    fn render(&self, template: &str, context: &Context) -> tera::Result<String> {
        self.tera.render(template, context)
    }

    /// Marketing page with the pay-what-you-want checkout buttons
    pub fn render_landing(&self, studio_name: &str) -> tera::Result<String> {
        let mut context = Context::new();
        context.insert("studio_name", studio_name);
        context.insert("services", &SERVICES);
        self.render(LANDING, &context)
    }

    pub fn render_success(&self, studio_name: &str) -> tera::Result<String> {
        let mut context = Context::new();
        context.insert("studio_name", studio_name);
        self.render(SUCCESS, &context)
    }

    pub fn render_cancel(&self, studio_name: &str) -> tera::Result<String> {
        let mut context = Context::new();
        context.insert("studio_name", studio_name);
        self.render(CANCEL, &context)
    }
}
