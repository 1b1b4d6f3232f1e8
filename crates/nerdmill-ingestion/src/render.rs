//! Template rendering of entity distributions.
//!
//! Each entity is formatted into one line by a pure function; the templates
//! only lay those lines out with a generation date (and a header for the
//! tab-separated file).

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use minijinja::{context, AutoEscape, Environment};
use quick_xml::escape::escape;

use nerdmill_common::columns;
use nerdmill_common::{NerdError, Result};
use nerdmill_ner::{AggregatedEntity, EntityDistribution};

const TEI_TEMPLATE: &str = "nerd.template.tei.xml";
const CSV_TEMPLATE: &str = "nerd.template.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Tei,
    Csv,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Tei, OutputFormat::Csv];

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Tei => "tei",
            OutputFormat::Csv => "csv",
        }
    }

    pub fn template_name(&self) -> &'static str {
        match self {
            OutputFormat::Tei => TEI_TEMPLATE,
            OutputFormat::Csv => CSV_TEMPLATE,
        }
    }

    fn builtin_template(&self) -> &'static str {
        match self {
            OutputFormat::Tei => include_str!("../templates/nerd.template.tei.xml"),
            OutputFormat::Csv => include_str!("../templates/nerd.template.csv"),
        }
    }
}

/// Optional columns of the tab-separated file.
///
/// A column is present when any entity of the document populates it, so all
/// rows of one file share a shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CsvColumns {
    pub rank: bool,
    pub taxon_name: bool,
    pub preferred_term: bool,
}

impl CsvColumns {
    pub fn for_distribution(distribution: &EntityDistribution) -> Self {
        distribution.iter().fold(Self::default(), |cols, e| Self {
            rank: cols.rank || e.rank.is_some(),
            taxon_name: cols.taxon_name || e.taxon_name.is_some(),
            preferred_term: cols.preferred_term || e.preferred_term.is_some(),
        })
    }

    pub fn header(&self) -> String {
        let mut names = vec![columns::ID, columns::CONFIDENCE];
        if self.rank {
            names.push(columns::RANK);
        }
        if self.taxon_name {
            names.push(columns::TAXON_NAME);
        }
        if self.preferred_term {
            names.push(columns::PREFERRED_TERM);
        }
        names.push(columns::SURFACE_FORMS);
        names.push(columns::MENTIONS);
        names.join("\t")
    }
}

/// `<term>` element for one entity.
pub fn tei_line(entity: &AggregatedEntity) -> String {
    format!(
        "<term key=\"{}\" cert=\"{}\">{}</term>",
        escape(entity.entity_id.as_str()),
        entity.confidence,
        escape(entity.label())
    )
}

/// Tab-separated row for one entity.
pub fn csv_line(entity: &AggregatedEntity, cols: &CsvColumns) -> String {
    let optional = |present: bool, value: &Option<String>| {
        present.then(|| value.as_deref().map(clean_cell).unwrap_or_default())
    };

    let mut cells = vec![clean_cell(&entity.entity_id), entity.confidence.to_string()];
    cells.extend(optional(cols.rank, &entity.rank));
    cells.extend(optional(cols.taxon_name, &entity.taxon_name));
    cells.extend(optional(cols.preferred_term, &entity.preferred_term));
    cells.push(
        entity
            .surface_forms
            .iter()
            .map(|s| clean_surface_form(s))
            .collect::<Vec<_>>()
            .join(columns::SURFACE_FORM_SEPARATOR),
    );
    cells.push(entity.mention_count.to_string());
    cells.join("\t")
}

fn clean_cell(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

/// A separator inside one surface form is tightened to a bare comma so the
/// joined cell splits back into the same forms.
fn clean_surface_form(value: &str) -> String {
    clean_cell(value).replace(columns::SURFACE_FORM_SEPARATOR, ",")
}

pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    /// Built-in templates, replaced by same-named files in `template_dir` when present.
    pub fn new(template_dir: Option<&Path>) -> Result<Self> {
        let mut env = Environment::new();
        // Lines are escaped when formatted.
        env.set_auto_escape_callback(|_| AutoEscape::None);

        for format in OutputFormat::ALL {
            let name = format.template_name();
            let custom = template_dir.map(|dir| dir.join(name)).filter(|p| p.is_file());
            match custom {
                Some(path) => {
                    let source = std::fs::read_to_string(&path)?;
                    tracing::info!(template = %path.display(), "Using custom template");
                    env.add_template_owned(name, source).map_err(render_error)?;
                }
                None => {
                    env.add_template(name, format.builtin_template()).map_err(render_error)?;
                }
            }
        }

        Ok(Self { env })
    }

    pub fn render(&self, format: OutputFormat, distribution: &EntityDistribution) -> Result<String> {
        self.render_at(format, distribution, Utc::now())
    }

    pub fn render_at(
        &self,
        format: OutputFormat,
        distribution: &EntityDistribution,
        date: DateTime<Utc>,
    ) -> Result<String> {
        let date = date.to_rfc3339_opts(SecondsFormat::Secs, true);
        let template = self.env.get_template(format.template_name()).map_err(render_error)?;

        let rendered = match format {
            OutputFormat::Tei => {
                let entities: Vec<String> = distribution.iter().map(tei_line).collect();
                template.render(context! { date, entities })
            }
            OutputFormat::Csv => {
                let cols = CsvColumns::for_distribution(distribution);
                let entities: Vec<String> =
                    distribution.iter().map(|e| csv_line(e, &cols)).collect();
                template.render(context! { date, header => cols.header(), entities })
            }
        };
        rendered.map_err(render_error)
    }
}

fn render_error(e: minijinja::Error) -> NerdError {
    NerdError::Render(e.to_string())
}
