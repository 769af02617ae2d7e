// src/store/gate.rs
// Access gate for the Messages store.

use tracing::error;

use crate::error::CoreError;
use crate::store::MessageStore;

/// Verifies the store file is reachable and a trivial query succeeds.
///
/// All failure is expressed as `false`; remediation guidance is logged, never
/// returned. Call sites that want transient-lock tolerance wrap this in
/// `retry_operation`.
pub async fn check_access(store: &dyn MessageStore) -> bool {
    let queryable = match tokio::fs::metadata(store.store_path()).await {
        Ok(_) => store.query_rows("SELECT 1;").await.map(|_| ()),
        Err(e) => Err(CoreError::Store(e.to_string())),
    };

    match queryable {
        Ok(()) => true,
        Err(e) => {
            error!(
                "Cannot access Messages store at {}: {e}\n\
                 To fix this, grant Full Disk Access to your terminal:\n\
                 1. Open System Settings > Privacy & Security > Full Disk Access\n\
                 2. Add your terminal application to the list\n\
                 3. Restart the terminal and try again",
                store.store_path().display()
            );
            false
        }
    }
}
