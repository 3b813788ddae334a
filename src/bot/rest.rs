// src/bot/rest.rs
use crate::bot::handler::{Embed, Reply};
use crate::network::{ensure_success, join_url};
use crate::utils::error::BotError;
use reqwest::Client;
use serde_json::{Value, json};

/// Posts replies to channels through the chat REST API
#[derive(Clone)]
pub struct RestClient {
    api_url: String,
    token: String,
    client: Client,
}

impl RestClient {
    /// Creates a new RestClient
    ///
    /// # Arguments
    /// * `api_url` - REST API base (e.g. "https://discord.com/api/v10")
    /// * `token` - Bot token used in the `Authorization` header
    /// * `client` - Shared HTTP client
    pub fn new(api_url: impl Into<String>, token: impl Into<String>, client: Client) -> Self {
        RestClient {
            api_url: api_url.into(),
            token: token.into(),
            client,
        }
    }

    /// Sends `reply` to `channel_id`
    ///
    /// # Errors
    /// Returns `BotError` if the request fails or the API rejects it
    pub async fn send(&self, channel_id: &str, reply: &Reply) -> Result<(), BotError> {
        let url = join_url(&self.api_url, &format!("/channels/{}/messages", channel_id));
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .json(&message_body(reply))
            .send()
            .await?;
        ensure_success(response, &url)?;
        Ok(())
    }
}

/// JSON body of a create-message request
fn message_body(reply: &Reply) -> Value {
    match reply {
        Reply::Text(content) => json!({ "content": content }),
        Reply::Embed(embed) => json!({ "embeds": [embed_json(embed)] }),
    }
}

fn embed_json(embed: &Embed) -> Value {
    let mut author = json!({
        "name": embed.author_name,
        "url": embed.author_url,
    });
    if let Some(icon) = &embed.icon_url {
        author["icon_url"] = json!(icon);
    }
    json!({
        "author": author,
        "description": embed.description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_body() {
        let body = message_body(&Reply::Text("hello".into()));
        assert_eq!(body, json!({"content": "hello"}));
    }

    #[test]
    fn test_embed_body_without_icon() {
        let body = message_body(&Reply::Embed(Embed {
            author_name: "Garlicoin | CoinMarketCap".into(),
            author_url: "https://coinmarketcap.com/currencies/garlicoin/".into(),
            icon_url: None,
            description: "**Rank:** 400".into(),
        }));
        assert_eq!(
            body,
            json!({"embeds": [{
                "author": {
                    "name": "Garlicoin | CoinMarketCap",
                    "url": "https://coinmarketcap.com/currencies/garlicoin/"
                },
                "description": "**Rank:** 400"
            }]})
        );
    }

    #[test]
    fn test_embed_body_with_icon() {
        let body = message_body(&Reply::Embed(Embed {
            author_name: "x".into(),
            author_url: "https://x".into(),
            icon_url: Some("https://x/32x32/x.png".into()),
            description: String::new(),
        }));
        assert_eq!(body["embeds"][0]["author"]["icon_url"], "https://x/32x32/x.png");
    }
}
