use reqwest::Client;

use crate::{error::DownloadError, table::Table};

/// Get the CSV file at `url` and parse it.  Any status other than 2xx is an error.
pub async fn fetch_table(client: &Client, url: &str) -> Result<Table, DownloadError> {
    let response = client.get(url).send().await?.error_for_status()?;
    let body = response.text().await?;
    Table::from_csv(&body)
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use tokio::net::TcpListener;

    use crate::{
        error::error_chain,
        utils::lib_test::{local_client, serve_once},
    };

    use super::*;

    #[tokio::test]
    async fn download_ok() -> Result<(), Box<dyn Error>> {
        let url = serve_once("200 OK", "id,name\n1,Alice\n2,Bob\n3,Carol\n", "hosts.csv").await?;
        let table = fetch_table(&local_client()?, &url).await?;
        assert_eq!(table.len(), 3);
        assert_eq!(table.column_names(), vec!["id", "name"]);
        Ok(())
    }

    #[tokio::test]
    async fn not_found() -> Result<(), Box<dyn Error>> {
        let url = serve_once("404 Not Found", "", "hosts.csv").await?;
        let res = fetch_table(&local_client()?, &url).await;
        match res {
            Err(DownloadError::Http(e)) => {
                assert_eq!(e.status().map(|s| s.as_u16()), Some(404))
            }
            other => panic!("unexpected result {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn server_error() -> Result<(), Box<dyn Error>> {
        let url = serve_once("500 Internal Server Error", "oops", "hosts.csv").await?;
        let res = fetch_table(&local_client()?, &url).await;
        assert!(matches!(res, Err(DownloadError::Http(_))));
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_host() -> Result<(), Box<dyn Error>> {
        // grab a free port, then close it
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        drop(listener);
        let url = format!("http://{}/reviews.csv", addr);
        let e = match fetch_table(&local_client()?, &url).await {
            Err(e) => e,
            Ok(_) => panic!("downloaded from a closed port"),
        };
        assert!(matches!(e, DownloadError::Http(_)));
        let text = error_chain(&e).to_lowercase();
        assert!(text.contains("connection refused"), "{}", text);
        Ok(())
    }

    #[tokio::test]
    async fn bad_csv() -> Result<(), Box<dyn Error>> {
        let url = serve_once("200 OK", "a,b\n1,2,3\n", "hosts.csv").await?;
        let res = fetch_table(&local_client()?, &url).await;
        assert!(matches!(res, Err(DownloadError::Parse(_))));
        Ok(())
    }

    #[ignore]
    #[tokio::test]
    async fn download_hosts() -> Result<(), Box<dyn Error>> {
        let dataset = crate::db::prod_db::ProdDb::raw_hosts();
        let table = fetch_table(&Client::new(), &dataset.url).await?;
        assert!(table.len() > 0);
        assert_eq!(table.column_names()[0], "id");
        Ok(())
    }
}
