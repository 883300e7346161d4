//! The CLI's own error boundary: wraps a failed module load so `main`
//! can render it into the top-level error list described in §6/§7,
//! distinct from the per-file `Diagnostics` an analysis run produces.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Loader(#[from] oberon_compiler::LoaderError),
}
