/// json request - parse a client payload and answer with a comparison
use debt_payoff_rs::ProjectionRequest;

const PAYLOAD: &str = r#"{
    "loans": [
        { "id": 7, "name": "Overdraft", "source": "bank", "currentBalance": "820.40", "minimumPayment": "35", "interestRate": "19.9", "startDate": "2024-02-01" },
        { "id": 8, "name": "Instant cash", "source": "mobile_app", "currentBalance": "300", "minimumPayment": "60", "interestRate": "120", "startDate": "2024-02-10" }
    ],
    "budget": { "monthlyAllocation": "200" },
    "strategy": "Avalanche"
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let request = ProjectionRequest::from_json(PAYLOAD)?;
    let projection = request.run()?;
    let comparison = request.compare()?;

    println!("{}", projection.to_json_pretty()?);
    println!("{}", serde_json::to_string_pretty(&comparison)?);

    Ok(())
}
