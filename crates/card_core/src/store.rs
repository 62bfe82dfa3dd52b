//! Binds a key-value store to one card's key and its JSON boolean encoding.

use shared::error::PunchCardError;
use storage::KeyValueStore;

pub struct CardStore<S: KeyValueStore> {
    inner: S,
    key: String,
    total: usize,
}

impl<S: KeyValueStore> CardStore<S> {
    pub fn new(inner: S, key: impl Into<String>, total: usize) -> Self {
        Self {
            inner,
            key: key.into(),
            total,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// `Ok(None)` when nothing is stored under the key. Unreadable or
    /// wrongly shaped values come back as `MalformedPersistedState`.
    pub fn load(&self) -> Result<Option<Vec<bool>>, PunchCardError> {
        let raw = self
            .inner
            .get(&self.key)
            .map_err(|err| PunchCardError::malformed(format!("{err:#}")))?;

        match raw {
            Some(raw) => decode_punches(&raw, self.total).map(Some),
            None => Ok(None),
        }
    }

    pub fn save(&mut self, punches: &[bool]) -> Result<(), PunchCardError> {
        let encoded = encode_punches(punches)?;
        self.inner
            .set(&self.key, &encoded)
            .map_err(|err| PunchCardError::write_failure(format!("{err:#}")))
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

pub fn encode_punches(punches: &[bool]) -> Result<String, PunchCardError> {
    serde_json::to_string(punches).map_err(|err| PunchCardError::write_failure(err.to_string()))
}

pub fn decode_punches(raw: &str, total: usize) -> Result<Vec<bool>, PunchCardError> {
    let punches: Vec<bool> = serde_json::from_str(raw)
        .map_err(|err| PunchCardError::malformed(format!("not a JSON array of booleans: {err}")))?;

    if punches.len() != total {
        return Err(PunchCardError::malformed(format!(
            "expected {total} punches, found {}",
            punches.len()
        )));
    }

    Ok(punches)
}
