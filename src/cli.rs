//! # frontup CLI
//!
//! Command-line glue around [`frontup_core`]: argument parsing, wiring the
//! AWS-backed collaborators, and user-visible output. Planning and publishing
//! live in the core crate.
//!
//! ## Flow
//! 1. Pick the bucket selector: the configured `S3BucketName`, or the S3
//!    origins of `CloudFrontDistributionId`.
//! 2. Plan every `Files` entry; any planning error aborts before upload.
//! 3. Print the plan, upload, invalidate `/*` and wait for completion.
//!
//! AWS configuration and clients are loaded on first use, so `--dry-run`
//! with an explicit bucket never touches the network. The dry run itself is
//! handled by [`publish`].

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use frontup_core::deploy::{
    plan_deployment, publish, BucketSelector, DeployOptions, DeployReport, PlannedUpload,
};

use crate::aws::AwsSdk;
use crate::distribution::CloudFrontDistribution;
use crate::load_config::{FrontupConfig, DEFAULT_CONFIG};
use crate::upload::S3Store;

/// Upload local files to S3 and invalidate the CloudFront distribution.
#[derive(Parser, Debug)]
#[clap(
    name = "frontup",
    version,
    about = "Upload files to the S3 origins of a CloudFront distribution and invalidate its cache"
)]
pub struct Cli {
    /// Path to the YAML config file
    #[clap(long, short, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Print the upload plan without uploading or invalidating
    #[clap(long)]
    pub dry_run: bool,
}

/// Run a deploy described by `config`.
///
/// Planning failures come back as [`frontup_core::DeployError::Planning`]
/// inside the `anyhow::Error`, so callers can tell them apart.
pub async fn run(cli: &Cli, config: &FrontupConfig) -> Result<DeployReport> {
    let sdk = AwsSdk::default();
    let distribution = config
        .distribution_id
        .as_ref()
        .map(|id| CloudFrontDistribution::new(sdk.clone(), id));

    let selector = BucketSelector::resolve(config.bucket.as_deref(), distribution.as_ref()).await?;
    let planned = plan_deployment(&config.files, &selector)?;
    print_plan(&mut io::stdout().lock(), &planned)?;

    let options = DeployOptions {
        dry_run: cli.dry_run,
        ..DeployOptions::default()
    };
    if !options.dry_run && distribution.is_some() {
        eprintln!("Uploading, then waiting for the invalidation to complete ...");
    }
    let store = S3Store::new(sdk.clone());
    let report = publish(planned, &store, distribution.as_ref(), &options).await?;
    tracing::debug!(aws_loaded = sdk.is_loaded(), "Deploy finished");

    println!("{} files uploaded", report.uploaded);
    if let Some(id) = &report.invalidation_id {
        eprintln!("The invalidation {id} has completed.");
    }
    Ok(report)
}

/// Write one block per planned upload.
pub fn print_plan<W: Write>(out: &mut W, planned: &[PlannedUpload]) -> io::Result<()> {
    for upload in planned {
        let instruction = &upload.instruction;
        writeln!(out, "putObject: {}", instruction.source_path.display())?;
        if let Some(content_type) = &instruction.content_type {
            writeln!(out, "  [ContentType: {content_type}]")?;
        }
        writeln!(
            out,
            "  ==> s3://{}/{}",
            upload.bucket, instruction.destination_key
        )?;
    }
    Ok(())
}
