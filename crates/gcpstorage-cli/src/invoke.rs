//! Single activity invocation.

use gcpstorage_activity::input::names;
use gcpstorage_activity::{ActivityOutput, Connector, StorageObjectActivity};
use serde_json::{Map, Value};

use crate::TRACING_TARGET_INVOKE;
use crate::config::Cli;

/// Reads the request, runs the activity against GCS and returns its output.
pub async fn invoke(cli: &Cli) -> anyhow::Result<ActivityOutput> {
    let metadata = cli.storage.load_metadata()?;
    let mut values = cli.input.read()?;
    if let Some(credentials) = cli.storage.load_credentials()? {
        fill_credentials(&mut values, credentials);
    }

    let activity = StorageObjectActivity::new(metadata, cli.storage.connector());
    run_activity(&activity, &values).await
}

/// Runs one invocation with any connector.
pub async fn run_activity<C: Connector>(
    activity: &StorageObjectActivity<C>,
    values: &Map<String, Value>,
) -> anyhow::Result<ActivityOutput> {
    tracing::debug!(
        target: TRACING_TARGET_INVOKE,
        operation = ?values.get(names::OPERATION),
        object = ?values.get(names::OBJECT_NAME),
        "invoking activity"
    );

    let output = activity.eval(values).await?;
    Ok(output)
}

/// Uses file-provided key material unless the request carries its own.
fn fill_credentials(values: &mut Map<String, Value>, credentials: String) {
    let present = values
        .get(names::JSON_CREDENTIALS)
        .is_some_and(|value| !value.is_null());

    if present {
        tracing::debug!(
            target: TRACING_TARGET_INVOKE,
            "request credentials take precedence over credentials file"
        );
        return;
    }

    values.insert(names::JSON_CREDENTIALS.to_string(), Value::String(credentials));
}
