//! Future types

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use futures_core::ready;
use pin_project_lite::pin_project;

use crate::{error::Closed, message, BoxError};

pin_project! {
    /// Future that completes when the worker has applied an [`Operation`](crate::Operation).
    ///
    /// A full batch makes this wait for the remote request; its outcome is logged, not returned.
    #[derive(Debug)]
    pub struct ResponseFuture {
        #[pin]
        state: ResponseState,
    }
}

pin_project! {
    #[project = ResponseStateProj]
    #[derive(Debug)]
    enum ResponseState {
        Failed {
            error: Option<BoxError>,
        },
        Rx {
            #[pin]
            rx: message::Rx,
        },
    }
}

impl ResponseFuture {
    pub(crate) fn new(rx: message::Rx) -> Self {
        ResponseFuture {
            state: ResponseState::Rx { rx },
        }
    }

    pub(crate) fn failed(err: BoxError) -> Self {
        ResponseFuture {
            state: ResponseState::Failed { error: Some(err) },
        }
    }
}

impl Future for ResponseFuture {
    type Output = Result<(), BoxError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();

        match this.state.as_mut().project() {
            ResponseStateProj::Failed { error } => {
                let error = error.take().unwrap_or_else(|| Closed::new().into());
                Poll::Ready(Err(error))
            }
            ResponseStateProj::Rx { rx } => match ready!(rx.poll(cx)) {
                Ok(Ok(())) => Poll::Ready(Ok(())),
                Ok(Err(invalid)) => Poll::Ready(Err(invalid.into())),
                Err(_) => Poll::Ready(Err(Closed::new().into())),
            },
        }
    }
}
