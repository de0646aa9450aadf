pub mod mock_agent;
