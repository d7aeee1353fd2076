use anyhow::Context;
use api_shared::{ClaimForm, ClaimLine, CommunicationForm, EligibilityForm, PatientDetails};
use clap::{Parser, Subcommand, ValueEnum};
use fhir::{ClaimUse, Resource};
use hcx_core::hcx::{templates, Parties};
use hcx_core::{
    client_from_config, ConverterConfig, HcxConfig, InsurancePlanConverter, LlmConfig,
    UnconfiguredClient,
};
use hcx_files::SourceDocument;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hcx")]
#[command(about = "HCX integration toolkit CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an insurance-plan PDF or workbook into a FHIR Bundle
    Convert {
        /// `.pdf`, `.xlsx` or `.xls` file
        file: PathBuf,
        /// Write the bundle here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print the text the converter would send to the model
    Extract {
        /// `.pdf`, `.xlsx` or `.xls` file
        file: PathBuf,
    },
    /// Check a bundle, InsurancePlan or array of InsurancePlans from a JSON file
    Validate {
        /// JSON file
        file: PathBuf,
    },
    /// Print a sample HCX request bundle
    Template {
        kind: TemplateKind,
        /// Patient name
        #[arg(long, default_value = "Ramesh Kumar")]
        patient: String,
        /// Policy number
        #[arg(long, default_value = "POL-2024-000123")]
        policy: String,
        /// Claim line as CODE=AMOUNT (repeatable; claim and preauth only)
        #[arg(long = "item", value_parser = parse_item)]
        items: Vec<ClaimLine>,
        /// Message text (communication only)
        #[arg(long, default_value = "Please share the discharge summary.")]
        message: String,
    },
    /// Print the current time in IST
    Timestamp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TemplateKind {
    Eligibility,
    Claim,
    Preauth,
    Communication,
}

/// Parses `CODE=AMOUNT`.
fn parse_item(raw: &str) -> Result<ClaimLine, String> {
    let (code, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected CODE=AMOUNT, got '{raw}'"))?;
    let code = code.trim();
    if code.is_empty() {
        return Err("item code is empty".into());
    }
    let amount: f64 = amount
        .trim()
        .parse()
        .map_err(|e| format!("invalid amount '{amount}': {e}"))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(format!("amount must be a non-negative number, got {amount}"));
    }
    Ok(ClaimLine {
        code: code.to_string(),
        description: None,
        amount,
    })
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_document(path: &Path, config: &ConverterConfig) -> anyhow::Result<SourceDocument> {
    SourceDocument::from_path(path, config.max_upload_bytes)
        .with_context(|| format!("cannot use {}", path.display()))
}

fn template(
    kind: TemplateKind,
    patient: String,
    policy_number: String,
    mut items: Vec<ClaimLine>,
    message: String,
    parties: &Parties,
) -> anyhow::Result<Value> {
    let patient = PatientDetails {
        name: patient,
        ..PatientDetails::default()
    };
    if items.is_empty() {
        items.push(ClaimLine {
            code: "consultation".into(),
            description: Some("Consultation".into()),
            amount: 1500.0,
        });
    }

    let bundle = match kind {
        TemplateKind::Eligibility => templates::eligibility_request(
            &EligibilityForm {
                patient,
                policy_number,
                ..EligibilityForm::default()
            },
            parties,
        )?,
        TemplateKind::Claim | TemplateKind::Preauth => {
            let claim_use = if kind == TemplateKind::Claim {
                ClaimUse::Claim
            } else {
                ClaimUse::Preauthorization
            };
            templates::claim_request(
                &ClaimForm {
                    patient,
                    policy_number,
                    items,
                    ..ClaimForm::default()
                },
                claim_use,
                parties,
            )?
        }
        TemplateKind::Communication => templates::communication_request(
            &CommunicationForm {
                message,
                ..CommunicationForm::default()
            },
            parties,
        )?,
    };
    Ok(bundle.to_value()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hcx_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert { file, output }) => {
            let config = ConverterConfig::from_lookup(&env_lookup)?;
            let llm = client_from_config(&LlmConfig::from_lookup(&env_lookup)?)?;
            let document = load_document(&file, &config)?;
            let converter = InsurancePlanConverter::new(Arc::new(config), llm);

            let conversion = converter.convert(&document).await?;
            for message in &conversion.dropped {
                eprintln!("skipped: {message}");
            }
            let bundle = conversion.bundle.to_value()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, serde_json::to_string_pretty(&bundle)?)
                        .with_context(|| format!("cannot write {}", path.display()))?;
                    eprintln!(
                        "Wrote {} entries to {}",
                        conversion.bundle.entry.len(),
                        path.display()
                    );
                }
                None => print_json(&bundle)?,
            }
            if !conversion.is_valid() {
                for error in &conversion.errors {
                    eprintln!("invalid: {error}");
                }
                anyhow::bail!("bundle failed validation");
            }
        }
        Some(Commands::Extract { file }) => {
            let config = ConverterConfig::from_lookup(&env_lookup)?;
            let document = load_document(&file, &config)?;
            let converter = InsurancePlanConverter::new(
                Arc::new(config),
                Arc::new(UnconfiguredClient::new("not needed for extraction")),
            );
            println!("{}", converter.extract(&document).await?);
        }
        Some(Commands::Validate { file }) => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("cannot read {}", file.display()))?;
            let value: Value = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not JSON", file.display()))?;
            let converter = InsurancePlanConverter::new(
                Arc::new(ConverterConfig::from_lookup(&env_lookup)?),
                Arc::new(UnconfiguredClient::new("not needed for validation")),
            );

            let checked = converter.validate_bundle(value)?;
            if checked.is_valid() {
                println!("Valid: {} entries", checked.bundle.entry.len());
            } else {
                for error in &checked.errors {
                    println!("{error}");
                }
                anyhow::bail!("{} validation errors", checked.errors.len());
            }
        }
        Some(Commands::Template {
            kind,
            patient,
            policy,
            items,
            message,
        }) => {
            let hcx = HcxConfig::from_lookup(&env_lookup)?;
            let parties = Parties {
                provider_code: hcx.provider_code,
                payer_code: hcx.payer_code,
            };
            print_json(&template(kind, patient, policy, items, message, &parties)?)?;
        }
        Some(Commands::Timestamp) => {
            println!("{}", hcx_types::ist_timestamp());
        }
        None => {
            println!("Use 'hcx --help' for commands");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parties() -> Parties {
        Parties {
            provider_code: "provider-1".into(),
            payer_code: "payer-1".into(),
        }
    }

    #[test]
    fn item_parses_code_and_amount() {
        let line = parse_item("99213 = 1500.50").unwrap();
        assert_eq!(line.code, "99213");
        assert_eq!(line.amount, 1500.5);
    }

    #[test]
    fn item_rejects_malformed_input() {
        assert!(parse_item("99213").is_err());
        assert!(parse_item("=10").is_err());
        assert!(parse_item("x=abc").is_err());
        assert!(parse_item("x=-5").is_err());
    }

    #[test]
    fn preauth_template_defaults_to_one_line() {
        let bundle = template(
            TemplateKind::Preauth,
            "Asha".into(),
            "POL-1".into(),
            Vec::new(),
            String::new(),
            &parties(),
        )
        .unwrap();

        assert_eq!(bundle["type"], "collection");
        let claim = bundle["entry"]
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| &entry["resource"])
            .find(|resource| resource["resourceType"] == "Claim")
            .unwrap();
        assert_eq!(claim["use"], "preauthorization");
        assert_eq!(claim["item"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn communication_template_carries_message() {
        let bundle = template(
            TemplateKind::Communication,
            "Asha".into(),
            "POL-1".into(),
            Vec::new(),
            "Send the X-ray report".into(),
            &parties(),
        )
        .unwrap();

        assert!(bundle.to_string().contains("Send the X-ray report"));
    }

    #[test]
    fn unsupported_file_is_rejected_before_conversion() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let err = load_document(&path, &ConverterConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported file type"));
    }
}
