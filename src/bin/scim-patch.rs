//! # SCIM PATCH runner
//!
//! Applies a PATCH request body to a resource file and prints the projected
//! result, using the same codec, engine and projection as the library.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin scim-patch -- User user.json patch.json
//! cargo run --bin scim-patch -- User user.json patch.json --schemas ./schemas/ --attributes userName,emails
//! ```
//!
//! ## Options
//!
//! - `--schemas <dir>`: load schemas from a directory instead of the embedded set
//! - `--attributes <list>`: comma-separated attributes to return
//! - `--excluded-attributes <list>`: comma-separated attributes to leave out
//!
//! ## Exit Codes
//!
//! - `0`: the PATCH applied
//! - `1`: bad arguments or unreadable input
//! - `2`: the PATCH or projection was rejected; the SCIM error code is printed

use scim_core::codec::{Decoder, Encoder, JsonCodec};
use scim_core::patch::PatchEngine;
use scim_core::projection::AttributeProjection;
use scim_core::schema::SchemaRegistry;
use scim_core::validation::{StandardValidator, Validator};
use scim_core::{ScimError, ScimResult};
use std::env;
use std::fs;
use std::process;

struct Args {
    resource_type: String,
    resource_file: String,
    patch_file: String,
    schema_dir: Option<String>,
    include: Option<String>,
    exclude: Option<String>,
}

fn main() {
    let args = match parse_args(env::args().collect()) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!();
            eprintln!(
                "Usage: scim-patch <resource-type> <resource.json> <patch.json> \
                 [--schemas <dir>] [--attributes <list>] [--excluded-attributes <list>]"
            );
            process::exit(1);
        }
    };

    let resource = read(&args.resource_file);
    let patch = read(&args.patch_file);

    match run(&args, &resource, &patch) {
        Ok(output) => println!("{}", output),
        Err(error) => {
            eprintln!("❌ {} ({}): {}", error.code(), error.status(), error);
            process::exit(2);
        }
    }
}

fn parse_args(raw: Vec<String>) -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut schema_dir = None;
    let mut include = None;
    let mut exclude = None;

    let mut iter = raw.into_iter().skip(1);
    while let Some(arg) = iter.next() {
        let slot = match arg.as_str() {
            "--schemas" => &mut schema_dir,
            "--attributes" => &mut include,
            "--excluded-attributes" => &mut exclude,
            _ => {
                positional.push(arg);
                continue;
            }
        };
        *slot = Some(iter.next().ok_or_else(|| format!("Missing value for {}", arg))?);
    }

    let [resource_type, resource_file, patch_file]: [String; 3] = positional
        .try_into()
        .map_err(|_| "Expected exactly three positional arguments".to_string())?;
    Ok(Args {
        resource_type,
        resource_file,
        patch_file,
        schema_dir,
        include,
        exclude,
    })
}

fn read(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading '{}': {}", path, e);
        process::exit(1);
    })
}

fn run(args: &Args, resource: &str, patch: &str) -> ScimResult<String> {
    let registry = match &args.schema_dir {
        Some(dir) => SchemaRegistry::from_schema_dir(dir)?,
        None => SchemaRegistry::new()?,
    };
    let schema = registry.resource_type_schema(&args.resource_type)?;
    let codec = JsonCodec::new();
    let validator = StandardValidator::new();

    let stored = codec.decode(resource, schema)?;
    let operations = codec.decode_operations(patch)?;
    if operations.is_empty() {
        return Err(ScimError::invalid_value("PATCH body carries no operations"));
    }

    let patched = PatchEngine::new(schema, validator).apply_all(&stored, &operations)?;
    let retrieved = validator.validate_retrieved(patched, schema)?;
    let projection =
        AttributeProjection::project(schema, args.include.as_deref(), args.exclude.as_deref())?;
    codec.encode(&projection.apply(&retrieved))
}
