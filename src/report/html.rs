//! Single-file HTML report renderer.
//!
//! Binds a [`ReportDocument`] into a template and writes the resolved HTML.
//! The template is compiled and checked against the helper set once, when
//! the renderer is built. HTML auto-escaping is on, so query text and other
//! document values reach the output escaped but otherwise verbatim.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use minijinja::Environment;
use tracing::debug;

use crate::report::ReportDocument;
use crate::report::helpers::HelperRegistry;
use crate::{ReportError, ReportResult};

/// Stock report template.
pub const REPORT_TEMPLATE: &str = include_str!("template.html");

const TEMPLATE_NAME: &str = "report.html";

/// Names a template may read from the document.
const DOCUMENT_FIELDS: &[&str] = &["generate_time", "slow_queries", "log_files"];

/// Globals the template engine always provides.
const ENGINE_GLOBALS: &[&str] = &["range", "dict", "namespace", "debug", "loop"];

pub struct ReportRenderer {
    env: Environment<'static>,
}

impl ReportRenderer {
    /// Compile `template` against `helpers`.
    ///
    /// Fails with [`ReportError::Template`] when the template does not parse
    /// and with [`ReportError::UnknownHelper`] when it references a name that
    /// is neither a helper nor a document field.
    pub fn new(template: &'static str, helpers: &HelperRegistry) -> ReportResult<Self> {
        let mut env = Environment::new();
        helpers.install(&mut env);
        env.add_template(TEMPLATE_NAME, template)
            .map_err(ReportError::Template)?;

        let tmpl = env.get_template(TEMPLATE_NAME).map_err(ReportError::Template)?;
        let mut unknown: Vec<String> = tmpl
            .undeclared_variables(false)
            .into_iter()
            .filter(|name| {
                !helpers.contains(name)
                    && !DOCUMENT_FIELDS.contains(&name.as_str())
                    && !ENGINE_GLOBALS.contains(&name.as_str())
            })
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            return Err(ReportError::UnknownHelper {
                name: unknown.join(", "),
            });
        }
        debug!(helpers = helpers.len(), "report template compiled");

        Ok(ReportRenderer { env })
    }

    /// Renderer for the stock template and helper set.
    pub fn standard() -> ReportResult<Self> {
        Self::new(REPORT_TEMPLATE, &HelperRegistry::standard())
    }

    /// Render the document to a string.
    pub fn render(&self, doc: &ReportDocument) -> ReportResult<String> {
        let tmpl = self
            .env
            .get_template(TEMPLATE_NAME)
            .map_err(ReportError::Template)?;
        tmpl.render(doc).map_err(ReportError::Render)
    }

    /// Render the document into `out`.
    pub fn render_to_writer<W: Write>(&self, doc: &ReportDocument, mut out: W) -> ReportResult<()> {
        let tmpl = self
            .env
            .get_template(TEMPLATE_NAME)
            .map_err(ReportError::Template)?;
        tmpl.render_to_write(doc, &mut out)
            .map_err(ReportError::Render)?;
        out.flush().map_err(|source| ReportError::Io {
            context: "failed to flush report".to_string(),
            source,
        })
    }

    /// Render the document into a new file at `path`.
    ///
    /// A render failure may leave a partial file behind.
    pub fn render_to_path(&self, doc: &ReportDocument, path: &Path) -> ReportResult<()> {
        let file = File::create(path).map_err(|source| ReportError::Io {
            context: format!("failed to create report file {}", path.display()),
            source,
        })?;
        self.render_to_writer(doc, BufWriter::new(file))
    }
}
