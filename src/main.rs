fn main() {
	if let Err(e) = reclink::run() {
		tracing::error!("An unrecoverable error has occurred and the application will exit: {e}");
		std::process::exit(1);
	}
}
