mod actor_handler;

pub(crate) use actor_handler::ActorHandler;
