// ── Lexeme repository ──
//
// Reads and edits lexemes through a shared `Session`. Every edit is sent
// with `bot=1` and `token=__AUTO__`; the entity passed in is updated
// locally from the response so callers can keep working with it without
// a reload (except after `update_from_json`, whose response is not
// usable for that).

use std::sync::Arc;

use lexdata_api::{Codec, NativeValue, Params, Session, SnakType};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::model::{Claim, Entity, Form, Language, Lexeme, Sense};
use crate::requests::{NewForm, NewLexeme, NewSense};

/// Entry point for reading and editing lexemes.
///
/// Cheap to clone; clones share the session and the datatype cache.
#[derive(Clone)]
pub struct LexemeRepo {
    session: Arc<Session>,
    codec: Codec,
}

impl LexemeRepo {
    pub fn new(session: Arc<Session>) -> Self {
        Self::with_codec(session, Codec::new())
    }

    /// Use a specific codec, e.g. one with a pre-seeded datatype cache.
    pub fn with_codec(session: Arc<Session>, codec: Codec) -> Self {
        Self { session, codec }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Fetch a lexeme by id (e.g. `L2`).
    pub async fn get_lexeme(&self, id: &str) -> Result<Lexeme, CoreError> {
        let not_found = || CoreError::NotFound {
            entity_type: "lexeme".into(),
            identifier: id.to_owned(),
        };

        let data = self
            .session
            .get(&Params::action("wbgetentities").with("ids", id))
            .await
            .map_err(|e| match e.api_error_code() {
                Some("no-such-entity") => not_found(),
                _ => CoreError::Api(e),
            })?;

        let entity = data
            .pointer("/entities")
            .and_then(|entities| entities.get(id))
            .ok_or_else(not_found)?;
        if entity.get("missing").is_some() {
            return Err(not_found());
        }
        debug!(id, "fetched lexeme");
        Ok(serde_json::from_value(entity.clone())?)
    }

    /// Replace `lexeme` with the current server version.
    pub async fn reload(&self, lexeme: &mut Lexeme) -> Result<(), CoreError> {
        *lexeme = self.get_lexeme(&lexeme.id).await?;
        Ok(())
    }

    // ── Claims ───────────────────────────────────────────────────────

    /// Build a detached claim, resolving the property's datatype.
    pub async fn claim(
        &self,
        property: &str,
        value: impl Into<NativeValue>,
    ) -> Result<Claim, CoreError> {
        let snak = self
            .codec
            .snak(&self.session, property, value.into())
            .await?;
        Ok(Claim::detached(snak))
    }

    /// Upload `claims` to `entity`, one `wbcreateclaim` each, and append
    /// the stored claims (with their new ids) to the local entity.
    ///
    /// Stops at the first failure; claims uploaded before it stay.
    pub async fn add_claims<E>(
        &self,
        entity: &mut E,
        claims: impl IntoIterator<Item = Claim>,
    ) -> Result<(), CoreError>
    where
        E: Entity + Send + ?Sized,
    {
        for claim in claims {
            let mut params = Params::edit("wbcreateclaim")
                .with("entity", entity.id())
                .with("snaktype", claim.mainsnak.snaktype.as_str())
                .with("property", claim.property());
            if claim.mainsnak.snaktype == SnakType::Value {
                let datavalue = claim.mainsnak.datavalue.as_ref().ok_or_else(|| {
                    lexdata_api::Error::NoValue {
                        property: claim.property().to_owned(),
                        snaktype: claim.mainsnak.snaktype.to_string(),
                    }
                })?;
                params = params.with("value", datavalue.request_payload().to_string());
            }

            let data = self.session.post(&params).await?;
            let stored = data
                .get("claim")
                .cloned()
                .ok_or_else(|| CoreError::missing("claim", "wbcreateclaim"))?;
            let stored: Claim = serde_json::from_value(stored)?;
            info!(entity = entity.id(), property = stored.property(), "claim added");
            entity.claims_mut().push(stored);
        }
        Ok(())
    }

    /// Encode each value for `property` and add it as a claim.
    pub async fn add_claim_values<E, I, V>(
        &self,
        entity: &mut E,
        property: &str,
        values: I,
    ) -> Result<(), CoreError>
    where
        E: Entity + Send + ?Sized,
        I: IntoIterator<Item = V>,
        V: Into<NativeValue>,
    {
        let mut claims = Vec::new();
        for value in values {
            claims.push(self.claim(property, value).await?);
        }
        self.add_claims(entity, claims).await
    }

    // ── Forms and senses ─────────────────────────────────────────────

    /// Add a form to `lexeme` and return its id.
    ///
    /// The representation is in `language` if given, otherwise in the
    /// language of the lexeme's first lemma.
    pub async fn create_form(
        &self,
        lexeme: &mut Lexeme,
        representation: &str,
        grammatical_features: &[&str],
        language: Option<&Language>,
        claims: impl IntoIterator<Item = Claim>,
    ) -> Result<String, CoreError> {
        let language_code = match language {
            Some(language) => language.code().to_owned(),
            None => lexeme
                .lemma_language()
                .ok_or_else(|| CoreError::missing("lemmas", "wbgetentities"))?
                .to_owned(),
        };
        let data = NewForm::new(representation, &language_code, grammatical_features);

        let response = self
            .session
            .post(
                &Params::edit("wbladdform")
                    .with("lexemeId", lexeme.id.as_str())
                    .with("data", serde_json::to_string(&data)?),
            )
            .await?;
        let form: Form = serde_json::from_value(
            response
                .get("form")
                .cloned()
                .ok_or_else(|| CoreError::missing("form", "wbladdform"))?,
        )?;
        let id = form.id.clone();
        info!(lexeme = %lexeme.id, form = %id, "created form");

        lexeme.forms.push(form);
        if let Some(form) = lexeme.forms.last_mut() {
            self.add_claims(form, claims).await?;
        }
        Ok(id)
    }

    /// Add a sense with the given `(language code, gloss)` pairs to
    /// `lexeme` and return its id.
    pub async fn create_sense<'a>(
        &self,
        lexeme: &mut Lexeme,
        glosses: impl IntoIterator<Item = (&'a str, &'a str)>,
        claims: impl IntoIterator<Item = Claim>,
    ) -> Result<String, CoreError> {
        let data = NewSense::new(glosses);

        let response = self
            .session
            .post(
                &Params::edit("wbladdsense")
                    .with("lexemeId", lexeme.id.as_str())
                    .with("data", serde_json::to_string(&data)?),
            )
            .await?;
        let sense: Sense = serde_json::from_value(
            response
                .get("sense")
                .cloned()
                .ok_or_else(|| CoreError::missing("sense", "wbladdsense"))?,
        )?;
        let id = sense.id.clone();
        info!(lexeme = %lexeme.id, sense = %id, "created sense");

        lexeme.senses.push(sense);
        if let Some(sense) = lexeme.senses.last_mut() {
            self.add_claims(sense, claims).await?;
        }
        Ok(id)
    }

    // ── Lexemes ──────────────────────────────────────────────────────

    /// Create a lexeme with a single lemma and return it as stored.
    pub async fn create_lexeme(
        &self,
        lemma: &str,
        language: &Language,
        lexical_category: &str,
        claims: impl IntoIterator<Item = Claim>,
    ) -> Result<Lexeme, CoreError> {
        let data = NewLexeme::new(lemma, language, lexical_category);
        let response = self
            .session
            .post(
                &Params::edit("wbeditentity")
                    .with("new", "lexeme")
                    .with("data", serde_json::to_string(&data)?),
            )
            .await?;
        let id = response
            .pointer("/entity/id")
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::missing("entity.id", "wbeditentity"))?;
        info!(id, lemma, "created lexeme");

        let mut lexeme = self.get_lexeme(id).await?;
        self.add_claims(&mut lexeme, claims).await?;
        Ok(lexeme)
    }

    /// Apply a raw `wbeditentity` document to `lexeme`, then reload it.
    ///
    /// With `overwrite`, the lexeme is cleared first and replaced by `data`.
    pub async fn update_from_json(
        &self,
        lexeme: &mut Lexeme,
        data: &Value,
        overwrite: bool,
    ) -> Result<(), CoreError> {
        let mut params = Params::edit("wbeditentity")
            .with("id", lexeme.id.as_str())
            .with("data", data.to_string());
        if overwrite {
            params = params.with("clear", "true");
        }

        let response = self.session.post(&params).await?;
        if response.get("success").and_then(Value::as_i64) != Some(1) {
            return Err(CoreError::Rejected {
                message: response.to_string(),
            });
        }
        info!(id = %lexeme.id, overwrite, "updated lexeme from JSON");
        self.reload(lexeme).await
    }

    /// Send `data` as a `wbeditentity` edit of lexeme `id` without loading
    /// it first. Returns the raw response.
    pub async fn overwrite_lexeme_by_json(&self, id: &str, data: &Value) -> Result<Value, CoreError> {
        let response = self
            .session
            .post(
                &Params::edit("wbeditentity")
                    .with("id", id)
                    .with("data", data.to_string()),
            )
            .await?;
        info!(id, "wrote lexeme JSON");
        Ok(response)
    }
}
