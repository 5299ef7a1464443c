use url::Url;

use crate::http_client::{agent, read_response_bytes};

use super::SpeechError;

/// Largest clip accepted from the provider.
pub const MAX_CLIP_BYTES: usize = 2 * 1024 * 1024;

/// Turns literal text into a playable audio clip.
pub trait Synthesizer: Send {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError>;
}

/// Text-to-speech over HTTP: `GET <provider>&q=<text>&tl=<language>` returning MP3.
pub struct HttpSynthesizer {
    endpoint: Url,
    language: String,
}

impl HttpSynthesizer {
    pub fn new(provider_url: &str, language: &str) -> Result<Self, SpeechError> {
        Ok(Self {
            endpoint: Url::parse(provider_url)?,
            language: language.to_string(),
        })
    }

    pub fn request_url(&self, text: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", text)
            .append_pair("tl", &self.language);
        url
    }
}

impl Synthesizer for HttpSynthesizer {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let url = self.request_url(text);
        let response = agent().get(url.as_str()).call().map_err(|err| match err {
            ureq::Error::Status(code, _) => SpeechError::Status(code),
            ureq::Error::Transport(transport) => SpeechError::Request(transport.to_string()),
        })?;
        let bytes = read_response_bytes(response, MAX_CLIP_BYTES)
            .map_err(|err| SpeechError::Request(err.to_string()))?;
        if bytes.is_empty() {
            return Err(SpeechError::EmptyClip(text.to_string()));
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_url_keeps_provider_params_and_appends_query() {
        let synth = HttpSynthesizer::new(
            "https://tts.example.com/speak?ie=UTF-8&client=tw-ob",
            "en",
        )
        .unwrap();
        let url = synth.request_url("SESSION START");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("ie".to_string(), "UTF-8".to_string()),
                ("client".to_string(), "tw-ob".to_string()),
                ("q".to_string(), "SESSION START".to_string()),
                ("tl".to_string(), "en".to_string()),
            ]
        );
    }

    #[test]
    fn invalid_provider_url_is_rejected() {
        assert!(matches!(
            HttpSynthesizer::new("not a url", "en"),
            Err(SpeechError::ProviderUrl(_))
        ));
    }
}
