use std::error::Error;
use std::fmt::Formatter;

/// Writes `error` followed by every error in its `source` chain, one numbered cause per line.
///
/// Used as the `Debug` body of the crate's error types, so a failed delivery
/// logs the whole chain down to the transport error.
pub fn error_chain_fmt(error: &impl Error, formatter: &mut Formatter<'_>) -> std::fmt::Result {
    writeln!(formatter, "{}", error)?;
    let causes = std::iter::successors(error.source(), |cause: &&dyn Error| (*cause).source());
    for (depth, cause) in causes.enumerate() {
        writeln!(formatter, "  {}: {}", depth + 1, cause)?;
    }
    Ok(())
}
