use crate::api::pop::Datacenter;
use crate::api::EdgeApi;
use crate::output::{self, Block};
use crate::CmdOutput;
use clap::Parser;
use common::{api::client::ApiError, CliError};
use prettytable::row;
use thiserror::Error;

/// List the points of presence that serve traffic
#[derive(Parser, Debug)]
#[command(name = "pops")]
pub struct PopsArgs {}

#[derive(Debug, Error)]
pub enum PopsError {
    #[error(transparent)]
    ApiError(#[from] ApiError),
}

impl CmdOutput for PopsError {
    fn code(&self) -> String {
        "pops/api-error".to_string()
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        match self {
            PopsError::ApiError(e) => e.exitcode(),
        }
    }
}

#[derive(strum_macros::Display, Debug)]
pub enum PopsMessage {
    #[strum(to_string = "{text}")]
    Datacenters {
        text: String,
        data: Option<serde_json::Value>,
    },
}

impl CmdOutput for PopsMessage {
    fn code(&self) -> String {
        "pops/list".to_string()
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        crate::errors::OK
    }

    fn data(&self) -> Option<serde_json::Value> {
        match self {
            PopsMessage::Datacenters { data, .. } => data.clone(),
        }
    }
}

pub fn render(datacenters: &[Datacenter], verbose: bool) -> String {
    if !verbose {
        let rows = datacenters
            .iter()
            .map(|d| row![d.name, d.code, d.group, d.shield, d.coordinates])
            .collect();
        return output::table(row!["NAME", "CODE", "GROUP", "SHIELD", "COORDINATES"], rows);
    }

    let mut block = Block::new();
    for (i, dc) in datacenters.iter().enumerate() {
        block
            .line(0, format!("Datacenter {}/{}", i + 1, datacenters.len()))
            .field(1, "Name", &dc.name)
            .field(1, "Code", &dc.code)
            .field(1, "Group", &dc.group)
            .field(1, "Shield", &dc.shield)
            .field(1, "Coordinates", &dc.coordinates)
            .blank();
    }
    block.render()
}

pub async fn run<A: EdgeApi + Sync>(
    _: PopsArgs,
    api: &A,
    verbose: bool,
) -> Result<PopsMessage, PopsError> {
    let datacenters = api.list_datacenters().await?;
    Ok(PopsMessage::Datacenters {
        text: render(&datacenters, verbose),
        data: output::to_json(&datacenters),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::pop::Coordinates;
    use crate::api::MockEdgeApi;

    fn datacenters() -> Vec<Datacenter> {
        vec![Datacenter {
            name: "Foobar".into(),
            code: "FBR".into(),
            group: "Bar".into(),
            shield: "Baz".into(),
            coordinates: Coordinates {
                latitude: 1.0,
                longitude: 2.0,
                x: 3.0,
                y: 4.0,
            },
        }]
    }

    #[tokio::test]
    async fn test_table() {
        let mut api = MockEdgeApi::new();
        api.expect_list_datacenters()
            .returning(|| Box::pin(std::future::ready(Ok(datacenters()))));

        let message = run(PopsArgs {}, &api, false).await.unwrap();
        let text = message.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0].split_whitespace().collect::<Vec<_>>(),
            ["NAME", "CODE", "GROUP", "SHIELD", "COORDINATES"]
        );
        assert!(lines[1].starts_with("Foobar"));
        assert!(lines[1].ends_with("{Latitude:1 Longitude:2 X:3 Y:4}"));
        assert_eq!(lines[1].find("FBR"), lines[0].find("CODE"));
        assert_eq!(message.data().unwrap()[0]["coordinates"]["longitude"], 2.0);
    }

    #[test]
    fn test_verbose() {
        assert_eq!(
            render(&datacenters(), true),
            "Datacenter 1/1\n\tName: Foobar\n\tCode: FBR\n\tGroup: Bar\n\tShield: Baz\n\tCoordinates: {Latitude:1 Longitude:2 X:3 Y:4}\n"
        );
    }
}
