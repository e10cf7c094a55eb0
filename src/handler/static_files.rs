use std::borrow::Cow;
use std::io;
use std::path::Path;

use async_std::fs;
use tracing::debug;

use crate::handler::registry::Resource;

/// Loads the bytes of a registered resource.
///
/// File resources are read from `root` on every request. The name comes from
/// the registry, never from the request, so no sanitizing is needed.
pub async fn load<'a>(root: &Path, resource: &'a Resource) -> io::Result<Cow<'a, [u8]>> {
    match resource {
        Resource::Inline(body) => Ok(Cow::Borrowed(body.as_bytes())),
        Resource::File(name) => {
            let full_path = root.join(name);
            debug!(path = %full_path.display(), "serving static file");
            fs::read(&full_path).await.map(Cow::Owned)
        }
    }
}
