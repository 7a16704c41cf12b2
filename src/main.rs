use mqstress::error::AppResult;

fn main() -> AppResult<()> {
    mqstress::entry::run()
}
