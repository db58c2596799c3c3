use async_trait::async_trait;
use log::debug;

use crate::errors::RepositoryError;

/// Upper and lower Latin letters plus digits
pub const ALPHABET: [char; 62] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j',
    'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', '0', '1',
    '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Longest code accepted by the `short_links.code` column
pub const MAX_CODE_LENGTH: usize = 32;

/// Produces fixed-length codes drawn uniformly from [`ALPHABET`]
#[derive(Debug, Clone)]
pub struct ShortCodeGenerator {
    length: usize,
}

impl ShortCodeGenerator {
    pub fn new(length: usize) -> Self {
        Self {
            length: length.clamp(1, MAX_CODE_LENGTH),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn generate(&self) -> String {
        let length = self.length;
        nanoid::nanoid!(length, &ALPHABET)
    }
}

/// True if `code` could have been produced by a generator
pub fn is_well_formed(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_CODE_LENGTH
        && code.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Outcome of a single insert-or-fail attempt
#[derive(Debug)]
pub enum Claim<T> {
    Claimed(T),
    /// The code belongs to another row already
    Taken,
}

/// Atomic insert-or-fail primitive the retry loop runs against.
///
/// Implementations must report a uniqueness violation on the code as
/// [`Claim::Taken`] and leave any surrounding transaction usable.
#[async_trait]
pub trait CodeSink: Send {
    type Output: Send;

    async fn try_claim(&mut self, code: &str) -> Result<Claim<Self::Output>, RepositoryError>;
}

/// Generates codes until `sink` accepts one. There is no attempt cap: the
/// storage constraint decides uniqueness and a free code always ends the loop.
pub async fn claim_unique_code<S: CodeSink>(
    sink: &mut S,
    generator: &ShortCodeGenerator,
) -> Result<S::Output, RepositoryError> {
    let mut attempts: u64 = 0;
    loop {
        attempts += 1;
        let code = generator.generate();
        match sink.try_claim(&code).await? {
            Claim::Claimed(output) => {
                if attempts > 1 {
                    debug!("Claimed short code '{}' after {} attempts", code, attempts);
                }
                return Ok(output);
            }
            Claim::Taken => debug!("Short code '{}' is taken, generating another", code),
        }
    }
}
