use clap::Parser;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "rpc-call")]
#[command(about = "Send a message to an RPC shim server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long, default_value = "/api")]
    prefix: String,

    /// Message name, e.g. `echo`
    message: String,

    /// JSON payload; omitted means an empty body
    payload: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut request = client.post(message_url(&cli.url, &cli.prefix, &cli.message));
    if let Some(payload) = cli.payload {
        // Fail early on malformed input rather than letting the server decide
        let _: Value = serde_json::from_str(&payload)?;
        request = request
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(payload);
    }

    let res = request.send().await?;
    print_response(res).await
}

fn message_url(base: &str, prefix: &str, message: &str) -> String {
    let base = base.trim_end_matches('/');
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{}/{}", base, message)
    } else {
        format!("{}/{}/{}", base, prefix, message)
    }
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    println!("{}", status);
    if text.is_empty() {
        return Ok(());
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_url() {
        assert_eq!(message_url("http://h:1", "/api", "echo"), "http://h:1/api/echo");
        assert_eq!(message_url("http://h:1/", "/api/", "echo"), "http://h:1/api/echo");
        assert_eq!(message_url("http://h:1", "/", "echo"), "http://h:1/echo");
    }
}
