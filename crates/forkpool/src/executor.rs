//! Process-isolated execution of a single job.
//!
//! [`run_isolated`] forks the calling worker thread's process, runs the job
//! function entirely inside the child's copy of the address space, and
//! brings back only the serialized outcome through an anonymous pipe. The
//! child's memory, panics and crashes are invisible to the parent beyond
//! that single message.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::os::fd::{FromRawFd, OwnedFd};
use std::panic::{catch_unwind, AssertUnwindSafe};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;

use crate::job::JobFn;
use crate::outcome::{Failure, JobError, JobResult, Outcome};

/// Serializes the pipe-create → fork → close-write-end window across worker
/// threads. Without it a sibling worker could fork while this job's write
/// end is still open in the parent, and its child would hold a copy — EOF on
/// this job's pipe would then wait on that unrelated child.
static FORK_LOCK: Mutex<()> = Mutex::new(());

/// Execute `func` in a forked child process and return its outcome.
///
/// The child inherits the parent's memory at the moment of the fork, so the
/// closure's captures and the shared `context` need no serialization; only
/// the returned value (or failure) crosses back, as JSON over a pipe whose
/// descriptors cannot outlive this call. The parent blocks until the child
/// has been reaped.
///
/// Forking a multithreaded process duplicates only the calling thread;
/// state owned by other threads (allocator internals, lock words) is
/// duplicated mid-flight. The child therefore does as little as possible:
/// run the closure, write one message, `_exit`.
pub(crate) fn run_isolated<T, C>(func: JobFn<T, C>, context: &C) -> JobResult<T>
where
    T: Serialize + DeserializeOwned,
{
    let guard = FORK_LOCK.lock();
    let (reader, writer) = outcome_channel()?;

    // SAFETY: plain fork(2); each branch below immediately assumes exactly
    // one side of the parent/child split.
    match unsafe { libc::fork() } {
        -1 => Err(Failure::Spawn {
            message: std::io::Error::last_os_error().to_string(),
        }),
        0 => child_main(func, context, reader, writer),
        pid => {
            // The child holds the only other copy of the write end once this
            // closes; drop it before letting siblings fork.
            drop(writer);
            drop(guard);
            collect_from_child(pid, reader)
        }
    }
}

/// Create the pipe the child writes its outcome into.
fn outcome_channel() -> Result<(OwnedFd, OwnedFd), Failure> {
    let mut fds = [0 as libc::c_int; 2];
    // SAFETY: fds points at a live two-element array for the duration of the
    // call.
    if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
        return Err(Failure::Spawn {
            message: std::io::Error::last_os_error().to_string(),
        });
    }
    // SAFETY: pipe(2) just handed us two fresh descriptors nobody else owns.
    Ok(unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) })
}

/// Child side: run the job, write the outcome, and exit without ever
/// returning into the duplicated parent context.
fn child_main<T, C>(func: JobFn<T, C>, context: &C, reader: OwnedFd, writer: OwnedFd) -> !
where
    T: Serialize,
{
    drop(reader);

    let outcome = match catch_unwind(AssertUnwindSafe(|| func(context))) {
        Ok(Ok(value)) => Outcome::Success { value },
        Ok(Err(error)) => Outcome::Failure { error },
        Err(payload) => Outcome::Failure {
            error: JobError::from_panic(payload),
        },
    };

    let mut sink = BufWriter::new(File::from(writer));
    let written = serde_json::to_writer(&mut sink, &outcome)
        .map_err(std::io::Error::from)
        .and_then(|()| sink.flush());
    if let Err(err) = written {
        // tracing state inherited from the parent's other threads may be
        // mid-lock after the fork; stderr is the only sink safe to touch.
        eprintln!("forkpool: child failed to serialize job outcome: {err}");
    }

    // _exit, not exit: the duplicated context must not run the parent's
    // cleanup handlers a second time.
    // SAFETY: terminating the child process is the entire point.
    unsafe { libc::_exit(0) }
}

/// Parent side: drain the outcome channel, reap the child, interpret.
fn collect_from_child<T>(pid: libc::pid_t, reader: OwnedFd) -> JobResult<T>
where
    T: DeserializeOwned,
{
    // Drain before reaping: a child blocked on a full pipe buffer would
    // otherwise never exit.
    let mut bytes = Vec::new();
    let drained = File::from(reader).read_to_end(&mut bytes);

    let status = wait_for_exit(pid)?;

    if let Err(err) = drained {
        return Err(Failure::Decode {
            message: err.to_string(),
        });
    }

    trace!(pid, status, bytes = bytes.len(), "child reaped");
    interpret_outcome(&bytes, status)
}

/// Reap the child, retrying on EINTR, and collapse its wait status.
fn wait_for_exit(pid: libc::pid_t) -> Result<i32, Failure> {
    loop {
        let mut status: libc::c_int = 0;
        // SAFETY: status points at a live c_int for the duration of the call.
        if unsafe { libc::waitpid(pid, &mut status, 0) } == pid {
            return Ok(exit_code(status));
        }
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::EINTR) {
            continue;
        }
        return Err(Failure::Spawn {
            message: format!("waitpid failed: {err}"),
        });
    }
}

/// Collapse a raw wait status into one integer: the exit code when the child
/// exited, the negated signal number when it was killed.
fn exit_code(raw: libc::c_int) -> i32 {
    if libc::WIFEXITED(raw) {
        libc::WEXITSTATUS(raw)
    } else if libc::WIFSIGNALED(raw) {
        -libc::WTERMSIG(raw)
    } else {
        raw
    }
}

/// Turn the drained outcome bytes plus the collapsed exit code into the
/// job's result.
///
/// Check order matters and is observable: a child that died before writing
/// anything reports `EmptyOutput` regardless of its exit status.
fn interpret_outcome<T>(bytes: &[u8], status: i32) -> JobResult<T>
where
    T: DeserializeOwned,
{
    if bytes.is_empty() {
        return Err(Failure::EmptyOutput);
    }
    if status != 0 {
        return Err(Failure::ChildExit { status });
    }
    match serde_json::from_slice::<Outcome<T>>(bytes) {
        Ok(Outcome::Success { value }) => Ok(value),
        Ok(Outcome::Failure { error }) => Err(Failure::Job { error }),
        Err(err) => Err(Failure::Decode {
            message: err.to_string(),
        }),
    }
}
