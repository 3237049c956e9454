//! Numbered pipe channels between this process and the encoder.
//!
//! Each channel is an anonymous pipe. The parent keeps its end as a tokio
//! pipe, the child end is installed on a fixed descriptor number right before
//! the encoder is executed.

use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};

use tokio::net::unix::pipe;
use tokio::process::Command;

use super::args::{input_channel, PROGRESS_CHANNEL};

/// Child ends are parked at or above this descriptor so installing them on
/// 3, 4, 5... can never overwrite one another.
const PARKING_FD: RawFd = 10;

/// Pipes for one encoder run.
pub(crate) struct ChannelSet {
    progress: pipe::Receiver,
    inputs: Vec<pipe::Sender>,
    child_ends: Vec<(OwnedFd, RawFd)>,
}

impl ChannelSet {
    /// Creates the progress channel plus `input_count` input channels.
    pub(crate) fn new(input_count: usize) -> io::Result<Self> {
        let (progress_reader, progress_writer) = io::pipe()?;
        let mut child_ends = vec![(park(progress_writer.into())?, PROGRESS_CHANNEL)];
        let progress = pipe::Receiver::from_owned_fd(progress_reader.into())?;

        let mut inputs = Vec::with_capacity(input_count);
        for index in 0..input_count {
            let (reader, writer) = io::pipe()?;
            child_ends.push((park(reader.into())?, input_channel(index)));
            inputs.push(pipe::Sender::from_owned_fd(writer.into())?);
        }

        Ok(Self {
            progress,
            inputs,
            child_ends,
        })
    }

    /// Arranges for the child ends to appear on their channel numbers in the
    /// spawned process.
    pub(crate) fn attach(&self, command: &mut Command) {
        let mapping: Vec<(RawFd, RawFd)> = self
            .child_ends
            .iter()
            .map(|(fd, channel)| (fd.as_raw_fd(), *channel))
            .collect();

        // SAFETY: the closure only calls dup2, which is async-signal-safe, and
        // does not allocate.
        unsafe {
            command.pre_exec(move || {
                for (source, channel) in &mapping {
                    if libc::dup2(*source, *channel) == -1 {
                        return Err(io::Error::last_os_error());
                    }
                }
                Ok(())
            });
        }
    }

    /// Closes the child ends held by this process and returns the parent ends.
    ///
    /// Must be called once the encoder is spawned, otherwise its channels
    /// never reach end of file.
    pub(crate) fn into_parent_ends(self) -> (pipe::Receiver, Vec<pipe::Sender>) {
        drop(self.child_ends);
        (self.progress, self.inputs)
    }
}

/// Duplicates `fd` onto the lowest free descriptor at or above
/// [`PARKING_FD`], close-on-exec.
fn park(fd: OwnedFd) -> io::Result<OwnedFd> {
    // SAFETY: `fd` is a valid open descriptor for the duration of the call.
    let parked = unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_DUPFD_CLOEXEC, PARKING_FD) };
    if parked == -1 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: fcntl returned a fresh descriptor that nothing else owns.
    Ok(unsafe { OwnedFd::from_raw_fd(parked) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_child_ends_are_parked() {
        let channels = ChannelSet::new(2).unwrap();
        assert_eq!(channels.inputs.len(), 2);

        let numbers: Vec<RawFd> = channels.child_ends.iter().map(|(_, n)| *n).collect();
        assert_eq!(numbers, vec![3, 4, 5]);
        assert!(channels
            .child_ends
            .iter()
            .all(|(fd, _)| fd.as_raw_fd() >= PARKING_FD));
    }

    #[tokio::test]
    async fn test_progress_channel_reaches_eof_after_child_ends_close() {
        let channels = ChannelSet::new(0).unwrap();
        let writer = channels.child_ends[0].0.try_clone().unwrap();
        let (mut progress, inputs) = channels.into_parent_ends();
        assert!(inputs.is_empty());

        let mut writer = std::fs::File::from(writer);
        std::io::Write::write_all(&mut writer, b"progress=end\n").unwrap();
        drop(writer);

        let mut text = String::new();
        progress.read_to_string(&mut text).await.unwrap();
        assert_eq!(text, "progress=end\n");
    }

    #[tokio::test]
    async fn test_input_channel_carries_bytes() {
        let channels = ChannelSet::new(1).unwrap();
        let reader = channels.child_ends[1].0.try_clone().unwrap();
        let (_progress, mut inputs) = channels.into_parent_ends();

        let mut sender = inputs.remove(0);
        sender.write_all(b"media").await.unwrap();
        drop(sender);

        let mut reader = std::fs::File::from(reader);
        let mut buf = Vec::new();
        std::io::Read::read_to_end(&mut reader, &mut buf).unwrap();
        assert_eq!(buf, b"media");
    }
}
