//! @ai:module:intent CLI for the VarSome variant annotation API
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on client, config, input, output, query

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use variantapi::{
    parse_params, read_variants, render_result, resolve_api_key, run_query, ClientConfig,
    OutputFormat, QueryRequest, VariantApi, VariantApiClient,
};

#[derive(Parser)]
#[command(name = "variantapi")]
#[command(
    version,
    about = "CLI utility for the VarSome API. Input variants directly with -q, \
             or point -f at a file with one variant per line. Results are written \
             to STDOUT; redirect to save them (> output.json)"
)]
#[command(group(ArgGroup::new("input").required(true).args(["query", "file", "schema"])))]
struct Cli {
    /// Variants to look up, e.g. chr19:20082943:1:G or several for a batch request
    #[arg(short = 'q', value_name = "VARIANT", num_args = 1..)]
    query: Vec<String>,

    /// File with one variant per line
    #[arg(short = 'f', value_name = "FILE")]
    file: Option<PathBuf>,

    /// Print the schema of lookup results
    #[arg(long)]
    schema: bool,

    /// Your key to the API
    #[arg(short = 'k', value_name = "API_KEY")]
    api_key: Option<String>,

    /// File containing your key to the API
    #[arg(long, value_name = "FILE")]
    key_file: Option<PathBuf>,

    /// Reference genome, either hg19 or hg38
    #[arg(short = 'g', value_name = "REF_GENOME")]
    ref_genome: Option<String>,

    /// Request parameters, e.g. add-all-data=1 expand-pubmed-articles=0
    #[arg(short = 'p', value_name = "KEY=VALUE", num_args = 1..)]
    params: Vec<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of variants per batch request
    #[arg(long)]
    batch_size: Option<usize>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Print single-line JSON
    #[arg(long)]
    compact: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::from(exit_status(&e))
        }
    }
}

/// @ai:intent Send logs to stderr so stdout carries only results
/// @ai:effects io
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "variantapi=debug"
    } else {
        "variantapi=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// API and network failures exit with 1, usage and configuration problems with 2.
fn exit_status(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<variantapi::Error>() {
        Some(e) if e.is_remote() => 1,
        _ => 2,
    }
}

/// @ai:intent Resolve configuration, run the query, render the result for stdout
/// @ai:effects network, fs:read
async fn run(cli: Cli) -> Result<String> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ClientConfig::default(),
    };

    if let Some(batch_size) = cli.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = Some(timeout);
    }
    config.api_key = resolve_api_key(cli.api_key, cli.key_file.as_deref(), config.api_key.take())?;

    let format = if cli.compact {
        OutputFormat::Json
    } else {
        OutputFormat::JsonPretty
    };

    let client = VariantApiClient::new(config)?;

    let result = if cli.schema {
        client.schema().await
    } else {
        let variants = match &cli.file {
            Some(path) => read_variants(path)?,
            None => cli.query,
        };
        let params = if cli.params.is_empty() {
            None
        } else {
            Some(parse_params(&cli.params)?)
        };
        let request = QueryRequest {
            variants,
            params,
            ref_genome: cli.ref_genome,
        };
        run_query(&client, &request).await
    };
    client.close();

    Ok(render_result(&result?, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use variantapi::output::NO_RESULT;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Writes a config pointing at the mock server, a key file and a variant file.
    fn workspace(server: &MockServer, variants: &str) -> (TempDir, Vec<String>) {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("variantapi.toml");
        let key = temp.path().join("varsome_api_key");
        let input = temp.path().join("variants.csv");

        std::fs::write(&config, format!("base_url = \"{}\"\nbatch_size = 2\n", server.uri()))
            .unwrap();
        std::fs::write(&key, "secret\n").unwrap();
        std::fs::write(&input, variants).unwrap();

        let args = vec![
            "variantapi".to_string(),
            "-c".to_string(),
            config.display().to_string(),
            "--key-file".to_string(),
            key.display().to_string(),
            "-f".to_string(),
            input.display().to_string(),
        ];
        (temp, args)
    }

    #[test]
    fn test_query_accepts_several_variants() {
        let cli = Cli::try_parse_from([
            "variantapi",
            "-q",
            "chr19:20082943:1:G",
            "rs113488022",
            "-g",
            "hg38",
            "-p",
            "add-all-data=1",
            "expand-pubmed-articles=0",
        ])
        .unwrap();
        assert_eq!(cli.query, vec!["chr19:20082943:1:G", "rs113488022"]);
        assert_eq!(cli.ref_genome.as_deref(), Some("hg38"));
        assert_eq!(cli.params.len(), 2);
    }

    #[test]
    fn test_input_is_required() {
        assert!(Cli::try_parse_from(["variantapi", "-k", "key"]).is_err());
    }

    #[test]
    fn test_query_and_file_are_exclusive() {
        let result = Cli::try_parse_from(["variantapi", "-q", "BRAF:V600E", "-f", "variants.csv"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_remote_errors_exit_with_one() {
        let remote = anyhow::Error::from(variantapi::Error::from_status(401));
        let local = anyhow::Error::from(variantapi::Error::MissingApiKey);
        assert_eq!(exit_status(&remote), 1);
        assert_eq!(exit_status(&local), 2);
    }

    #[tokio::test]
    async fn test_run_batch_from_file_prints_no_result_when_empty() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/lookup/batch/hg19"))
            .and(header("authorization", "Token secret"))
            .and(body_json(json!({"variants": ["BRAF:V600E", "TP53:R175L"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let (_temp, args) = workspace(&server, "BRAF:V600E\n\nTP53:R175L\n");
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(run(cli).await.unwrap(), NO_RESULT);
    }

    #[tokio::test]
    async fn test_run_single_variant_from_file_prints_pretty_json() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/lookup/rs113488022/hg38"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"pos": 1, "chromosome": "chr3"})))
            .expect(1)
            .mount(&server)
            .await;

        let (_temp, mut args) = workspace(&server, "rs113488022\n");
        args.extend(["-g".to_string(), "hg38".to_string()]);
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(
            run(cli).await.unwrap(),
            "{\n    \"chromosome\": \"chr3\",\n    \"pos\": 1\n}"
        );
    }

    #[tokio::test]
    async fn test_run_remote_failure_exits_with_one() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let (_temp, args) = workspace(&server, "BRAF:V600E\nTP53:R175L\n");
        let cli = Cli::try_parse_from(args).unwrap();

        let err = run(cli).await.unwrap_err();
        assert_eq!(exit_status(&err), 1);
    }
}
