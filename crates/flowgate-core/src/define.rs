// Apply the catalog's object definitions to one session.

use tracing::{debug, error, info, warn};

use crate::catalog::Catalog;
use crate::session::DefinitionTarget;

/// Define every catalog object the session does not already know.
///
/// Objects already defined are skipped, so a second call makes no define
/// request at all and still reports success. A descriptor whose definition
/// cannot be built is logged and skipped while the rest are still applied.
/// The result is `false` if the apply fails, or if a descriptor was skipped
/// alongside at least one definition that was applied. With nothing to
/// apply the call succeeds.
pub async fn define_objects<S: DefinitionTarget>(session: Option<&mut S>, catalog: &Catalog) -> bool {
    let Some(session) = session else {
        error!("cannot define objects: no session");
        return false;
    };
    let side = session.side();

    let mut pending = Vec::new();
    let mut all_added = true;
    for descriptor in catalog.objects() {
        if session.is_object_defined(descriptor.id) {
            debug!(%side, object = descriptor.id, "object already defined");
            continue;
        }
        match descriptor.definition() {
            Ok(definition) => pending.push(definition),
            Err(e) => {
                warn!(%side, object = descriptor.id, error = %e, "could not add object definition");
                all_added = false;
            }
        }
    }

    if pending.is_empty() {
        return true;
    }

    let count = pending.len();
    match session.define(pending).await {
        Ok(()) => {
            info!(%side, count, "objects defined");
            all_added
        }
        Err(e) => {
            error!(%side, error = %e, "failed to apply object definitions");
            false
        }
    }
}
