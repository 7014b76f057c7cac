use serde::Serialize;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait TemplateService: Send + Sync + 'static {
    /// Render the given template.
    fn render<T: Template + 'static>(&self, template: &T) -> anyhow::Result<String>;
}

#[cfg(feature = "mock")]
impl MockTemplateService {
    pub fn with_render<T: Template + Send + PartialEq + std::fmt::Debug + 'static>(
        mut self,
        template: T,
        result: String,
    ) -> Self {
        self.expect_render()
            .once()
            .with(mockall::predicate::eq(template))
            .return_once(|_| Ok(result));
        self
    }
}

/// A named template together with the data it is rendered from.
///
/// Names end in `.html`, which turns on auto escaping for every interpolated
/// value.
pub trait Template: Serialize {
    const NAME: &'static str;
    const TEMPLATE: &'static str;
}

pub const BASE_TEMPLATE: (&str, &str) = ("base.html", include_str!("../templates/base.html"));

macro_rules! templates {
    ($( $ident:ident ( $path:literal ), )* ) => {
        $(
            impl Template for $ident {
                const NAME: &'static str = $path;
                const TEMPLATE: &'static str = include_str!(concat!("../templates/", $path));
            }
        )*

        pub const TEMPLATES: &[(&str, &str)] = &[
            $( ($ident::NAME, $ident::TEMPLATE) ),*
        ];
    };
}

templates! {
    ContactNotificationTemplate("contact_notification.html"),
}

/// Notification sent to the site owner for every inquiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactNotificationTemplate {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub subject: String,
    pub message: String,
}
