use std::collections::BTreeMap;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use contracts::domain::a002_form_binding::FormBinding;
use contracts::shared::TypedValue;
use contracts::usecases::u502_survey_launch::DispatchResult;

use tables_backend::domain::a001_table_metadata::MetadataStoreClient;
use tables_backend::domain::a003_column_settings::ColumnSettings;
use tables_backend::shared::config;
use tables_backend::shared::data::{db, SqliteSessions};
use tables_backend::system;
use tables_backend::usecases::u502_survey_launch::{LaunchCoordinator, ProcessAppHost};
use tables_backend::usecases::u503_row_with_survey::SurveyBridge;

#[derive(Parser, Debug)]
#[command(name = "tables-survey")]
#[command(about = "Table metadata and Survey row launcher")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the form binding and stored metadata of a table
    Show { table_id: String },
    /// Bind a table to a custom Survey form
    Bind { table_id: String, form_id: String },
    /// Revert a table to its generated form
    Unbind { table_id: String },
    /// Open Survey to add a row, optionally prepopulated with key=value pairs
    Add {
        table_id: String,
        values: Vec<String>,
    },
    /// Open Survey to edit an existing row
    Edit { table_id: String, row_id: String },
    /// Read or set a column width
    Width {
        table_id: String,
        element_key: String,
        value: Option<i32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    system::tracing::initialize()?;

    let cfg = config::load_config()?;
    let db_path = config::get_database_path(&cfg)?;
    let conn = db::initialize_database(&db_path).await?;
    tracing::info!("Metadata database: {}", db_path.display());

    let sessions = Arc::new(SqliteSessions::new());
    sessions.register(&cfg.survey.app_name, conn);
    let store = MetadataStoreClient::new(sessions.clone(), cfg.survey.app_name.clone());

    let host = Arc::new(ProcessAppHost::from_config(&cfg.survey));
    let coordinator = LaunchCoordinator::new(host.clone(), host);
    let bridge = SurveyBridge::new(store.clone(), coordinator, cfg.survey.package_name.clone());

    match cli.command {
        Command::Show { table_id } => {
            let binding = bridge.resolve_form_binding(&table_id).await?;
            println!("{}", serde_json::to_string_pretty(&binding)?);
            for entry in store.list_table(&table_id).await? {
                println!(
                    "{}/{}/{} = {} ({})",
                    entry.key.partition,
                    entry.key.aspect,
                    entry.key.key,
                    entry.value,
                    entry.element_type
                );
            }
        }
        Command::Bind { table_id, form_id } => {
            let binding = FormBinding::explicit(form_id);
            bridge.persist_form_binding(&table_id, &binding).await?;
        }
        Command::Unbind { table_id } => {
            let binding = FormBinding::implicit_for(&table_id);
            bridge.persist_form_binding(&table_id, &binding).await?;
        }
        Command::Add { table_id, values } => {
            let prepopulated = parse_prepopulated(&values)?;
            let result = bridge.begin_add_row(&table_id, Some(prepopulated)).await?;
            report(&result)?;
        }
        Command::Edit { table_id, row_id } => {
            let result = bridge.begin_edit_row(&table_id, &row_id).await?;
            report(&result)?;
        }
        Command::Width {
            table_id,
            element_key,
            value,
        } => {
            let settings = ColumnSettings::new(store);
            if let Some(width) = value {
                if !settings
                    .set_column_width(&table_id, &element_key, width)
                    .await?
                {
                    anyhow::bail!("column width {} is not allowed", width);
                }
            }
            println!(
                "{}",
                settings.column_width(&table_id, &element_key).await?
            );
        }
    }

    Ok(())
}

fn report(result: &DispatchResult) -> anyhow::Result<()> {
    if let DispatchResult::NotInstalled { package_name } = result {
        eprintln!("Survey ({}) is not installed", package_name);
    }
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

/// `key=value` из командной строки: число, логическое значение или строка
fn parse_prepopulated(pairs: &[String]) -> anyhow::Result<BTreeMap<String, TypedValue>> {
    let mut values = BTreeMap::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("expected key=value, got '{}'", pair))?;
        let number = raw.parse::<f64>().ok().filter(|v| v.is_finite());
        let value = if let Ok(v) = raw.parse::<i64>() {
            TypedValue::Integer(v)
        } else if let Some(v) = number {
            TypedValue::Number(v)
        } else if let Ok(v) = raw.parse::<bool>() {
            TypedValue::Boolean(v)
        } else {
            TypedValue::String(raw.to_string())
        };
        values.insert(key.to_string(), value);
    }
    Ok(values)
}
