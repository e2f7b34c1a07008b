mod collector;
mod dispatcher;
mod worker;

pub(crate) use collector::Collector;
pub(crate) use dispatcher::dispatch;
pub(crate) use worker::Worker;
