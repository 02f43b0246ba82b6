use std::io::Write;

use meshname_client::{BindingOutcome, Interpreter, NameClient, Resolver};
use meshname_core::Path;

use super::Exit;

/// Bind `name` under `root` and print one bound identifier per line.
///
/// A negative binding exits 2; a tree the client cannot decompose is
/// an error.
pub async fn bind<T, W>(
    client: &NameClient<T>,
    root: &Path,
    name: &Path,
    out: &mut W,
) -> anyhow::Result<Exit>
where
    T: Interpreter + Resolver + Clone,
    W: Write,
{
    match client.bind(root, name).await? {
        BindingOutcome::Leaf(ids) => {
            for id in ids {
                writeln!(out, "{id}")?;
            }
            out.flush()?;
            Ok(Exit::Success)
        }
        BindingOutcome::NegativeBinding(name) => Ok(Exit::NegativeBinding(format!(
            "negative binding: {name} in {root}"
        ))),
        BindingOutcome::Unsupported(tree) => anyhow::bail!("unsupported bound tree: {tree}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshname_client::mock::{MockTransport, Reply};
    use meshname_client::{BoundTree, ClientOptions, TransportError};

    fn path(s: &str) -> Path {
        Path::read(s).unwrap()
    }

    async fn run(mock: &MockTransport, name: &str) -> (anyhow::Result<Exit>, String) {
        let client = NameClient::new(mock.clone(), ClientOptions::default());
        let mut out = Vec::new();
        let result = bind(&client, &path("/svc"), &path(name), &mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn prints_bound_identifier() {
        let mock = MockTransport::new();
        mock.bind_to(
            &path("/svc/foo"),
            Reply::Ok(BoundTree::leaf(path("/#/io.l5d.fs/foo"))),
        );

        let (result, out) = run(&mock, "/svc/foo").await;
        assert_eq!(result.unwrap(), Exit::Success);
        assert_eq!(out, "/#/io.l5d.fs/foo\n");
    }

    #[tokio::test]
    async fn negative_binding_exits_two() {
        let mock = MockTransport::new();
        mock.bind_to(&path("/svc/foo"), Reply::Ok(BoundTree::Neg));

        let (result, out) = run(&mock, "/svc/foo").await;
        assert_eq!(result.unwrap().code(), 2);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn unsupported_tree_and_transport_errors_fail() {
        let mock = MockTransport::new();
        mock.bind_to(
            &path("/svc/alt"),
            Reply::Ok(BoundTree::Alt(vec![
                BoundTree::leaf(path("/#/a")),
                BoundTree::leaf(path("/#/b")),
            ])),
        );
        mock.bind_to(&path("/svc/down"), Reply::Err(TransportError::DeadlineExceeded));

        let (result, _) = run(&mock, "/svc/alt").await;
        assert!(result.unwrap_err().to_string().contains("/#/a | /#/b"));

        let (result, _) = run(&mock, "/svc/down").await;
        assert!(result.is_err());
    }
}
