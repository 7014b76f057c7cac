use std::sync::Arc;

use agentsite_templates_contracts::{Template, TemplateService, BASE_TEMPLATE, TEMPLATES};
use anyhow::Context;
use tera::Tera;

#[derive(Debug, Clone)]
pub struct TemplateServiceImpl {
    tera: Arc<Tera>,
}

impl TemplateServiceImpl {
    pub fn new() -> anyhow::Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(std::iter::once(BASE_TEMPLATE).chain(TEMPLATES.iter().copied()))
            .context("Failed to compile email templates")?;

        Ok(Self { tera: tera.into() })
    }
}

impl TemplateService for TemplateServiceImpl {
    #[tracing::instrument(level = "trace", skip_all, fields(template = T::NAME))]
    fn render<T: Template>(&self, template: &T) -> anyhow::Result<String> {
        let context = tera::Context::from_serialize(template)?;
        self.tera.render(T::NAME, &context).map_err(Into::into)
    }
}
