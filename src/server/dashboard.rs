//! Dashboard page
//!
//! The page is a static shell; it pulls advisories and services from the
//! JSON endpoints in the browser, so it renders with an empty context.

use minijinja::{context, Environment, Value};

use crate::Result;

const TEMPLATE_NAME: &str = "dashboard.html";
const TEMPLATE_SOURCE: &str = include_str!("../../templates/dashboard.html");

pub struct Dashboard {
    env: Environment<'static>,
}

impl Dashboard {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, TEMPLATE_SOURCE)?;
        Ok(Self { env })
    }

    /// Data handed to the template
    pub fn context(&self) -> Value {
        context! {}
    }

    pub fn render(&self) -> Result<String> {
        let template = self.env.get_template(TEMPLATE_NAME)?;
        Ok(template.render(self.context())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_context_is_empty() {
        let dashboard = Dashboard::new().unwrap();
        assert_eq!(dashboard.context().len(), Some(0));
    }

    #[test]
    fn test_dashboard_renders() {
        let page = Dashboard::new().unwrap().render().unwrap();
        assert!(page.contains("<title>Terminal</title>"));
        assert!(page.contains("/advisories"));
        assert!(page.contains("/services"));
    }
}
