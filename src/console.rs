//! The interactive menu of the peer binary.
//!
//! ```text
//! Choose an option:
//! 1. Query hash
//! 2. Exit
//! 3. Download file
//! 4. Print manifest
//! 5. Push file to peer
//! ```
//!
//! Invalid input is reported and asked again. The menu ends on `Exit` or
//! when the input ends.
use std::path::PathBuf;
use std::str::FromStr;

use swarmshare_content::Manifest;
use swarmshare_primitives::{Fingerprint, PeerAddress};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::agent::PeerAgent;

/// A menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Query,
    Exit,
    Download,
    Manifest,
    Push,
}

impl FromStr for Choice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Choice::Query),
            "2" => Ok(Choice::Exit),
            "3" => Ok(Choice::Download),
            "4" => Ok(Choice::Manifest),
            "5" => Ok(Choice::Push),
            other => Err(format!("Invalid choice: {other:?}. Please enter 1, 2, 3, 4 or 5.")),
        }
    }
}

/// What to download: a whole-file fingerprint or a manifest file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadSource {
    Fingerprint(Fingerprint),
    ManifestFile(PathBuf),
}

impl DownloadSource {
    /// A number is a fingerprint, anything else a manifest path.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();

        if input.is_empty() {
            return None;
        }

        Some(match input.parse::<u64>() {
            Ok(value) => DownloadSource::Fingerprint(Fingerprint::new(value)),
            Err(_) => DownloadSource::ManifestFile(PathBuf::from(input)),
        })
    }
}

const MENU: &str = "\nChoose an option:\n1. Query hash\n2. Exit\n3. Download file\n4. Print manifest\n5. Push file to peer\n";

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Runs the menu until the user exits or the input ends.
    ///
    /// # Errors
    ///
    /// Will return an error if the console can not be read or written.
    pub async fn run(&mut self, agent: &PeerAgent) -> std::io::Result<()> {
        loop {
            self.write(MENU).await?;

            let Some(choice) = self.prompt_parsed::<Choice>("Enter choice (1, 2, 3, 4 or 5): ").await? else {
                return Ok(());
            };

            let keep_going = match choice {
                Choice::Query => self.query(agent).await?,
                Choice::Exit => {
                    self.write("Exiting...\n").await?;
                    false
                }
                Choice::Download => self.download(agent).await?,
                Choice::Manifest => self.manifest(agent).await?,
                Choice::Push => self.push(agent).await?,
            };

            if !keep_going {
                return Ok(());
            }
        }
    }

    async fn query(&mut self, agent: &PeerAgent) -> std::io::Result<bool> {
        let Some(value) = self.prompt_parsed::<u64>("Enter hash to query: ").await? else {
            return Ok(false);
        };

        let fingerprint = Fingerprint::new(value);

        match agent.query(fingerprint).await {
            Ok(owners) if owners.is_empty() => self.write(&format!("No peer owns {fingerprint}.\n")).await?,
            Ok(owners) => {
                let owners: Vec<String> = owners.iter().map(ToString::to_string).collect();
                self.write(&format!("Peers for hash {fingerprint}: {}\n", owners.join(", "))).await?;
            }
            Err(err) => self.write(&format!("Query failed: {err}\n")).await?,
        }

        Ok(true)
    }

    async fn download(&mut self, agent: &PeerAgent) -> std::io::Result<bool> {
        let source = loop {
            let Some(line) = self.prompt("Enter hash or manifest path: ").await? else {
                return Ok(false);
            };

            match DownloadSource::parse(&line) {
                Some(source) => break source,
                None => self.write("Please enter a hash or a manifest path.\n").await?,
            }
        };

        let manifest = match source {
            DownloadSource::Fingerprint(fingerprint) => Manifest::whole_file(fingerprint),
            DownloadSource::ManifestFile(path) => match Manifest::load(&path) {
                Ok(manifest) => manifest,
                Err(err) => {
                    self.write(&format!("{err}\n")).await?;
                    return Ok(true);
                }
            },
        };

        let output = loop {
            let Some(line) = self.prompt("Enter file path to output: ").await? else {
                return Ok(false);
            };

            if !line.is_empty() {
                break PathBuf::from(line);
            }
        };

        match agent.download(&manifest, &output).await {
            Ok(report) => {
                self.write(&format!(
                    "Downloaded {} bytes in {} chunks to {}\n",
                    report.bytes,
                    report.chunks,
                    report.output.display()
                ))
                .await?;
            }
            Err(err) => self.write(&format!("Download failed: {err}\n")).await?,
        }

        Ok(true)
    }

    async fn manifest(&mut self, agent: &PeerAgent) -> std::io::Result<bool> {
        let Some(line) = self.prompt("Enter file path: ").await? else {
            return Ok(false);
        };

        let path = PathBuf::from(line);
        let path = if path.is_relative() && !path.exists() {
            agent.content_dir().join(path)
        } else {
            path
        };

        let json = agent
            .manifest_of(&path)
            .await
            .map_err(swarmshare_content::ManifestError::from)
            .and_then(|manifest| manifest.to_json());

        match json {
            Ok(json) => self.write(&format!("{json}\n")).await?,
            Err(err) => self.write(&format!("{err}\n")).await?,
        }

        Ok(true)
    }

    /// Sends a local file to another peer, which stores it and serves it.
    async fn push(&mut self, agent: &PeerAgent) -> std::io::Result<bool> {
        let Some(peer) = self.prompt_parsed::<PeerAddress>("Enter peer address: ").await? else {
            return Ok(false);
        };

        let Some(line) = self.prompt("Enter file path: ").await? else {
            return Ok(false);
        };

        let path = PathBuf::from(line);
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()).map(ToString::to_string) else {
            self.write(&format!("Not a file: {}\n", path.display())).await?;
            return Ok(true);
        };

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                self.write(&format!("Can not read {}: {err}\n", path.display())).await?;
                return Ok(true);
            }
        };

        let len = bytes.len();

        match agent.push(peer, &file_name, bytes).await {
            Ok(()) => self.write(&format!("Pushed {len} bytes of {file_name} to {peer}\n")).await?,
            Err(err) => self.write(&format!("Push failed: {err}\n")).await?,
        }

        Ok(true)
    }

    /// Asks until the answer parses. It returns `None` when the input ends.
    async fn prompt_parsed<T>(&mut self, question: &str) -> std::io::Result<Option<T>>
    where
        T: FromStr,
    {
        loop {
            let Some(line) = self.prompt(question).await? else {
                return Ok(None);
            };

            match line.parse::<T>() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => self.write(&format!("Invalid value: {line:?}, try again.\n")).await?,
            }
        }
    }

    /// Writes the question and reads one trimmed line. It returns `None`
    /// when the input ends.
    async fn prompt(&mut self, question: &str) -> std::io::Result<Option<String>> {
        self.write(question).await?;

        let mut line = String::new();

        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim().to_string()))
    }

    async fn write(&mut self, text: &str) -> std::io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await
    }
}
